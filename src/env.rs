// Elaboration environment (C2, part of C4): fresh-identity supply, the
// object map, and the analysis map. Where the teacher's `Env` was a chain of
// lexical scopes keyed by string identifiers, this `Env` is the single
// mutable resource the `Comp` monad threads through a compilation: it owns
// the var/loc counters and the two heap-like maps `spec.md` §3 describes.

use std::collections::{HashMap, VecDeque};

use tracing::debug;

use crate::ast::{Loc, Var};
use crate::error::ElabError;
use crate::field::{Field, FieldParams};

/// Binding for one `(Loc, index)` slot: either another heap object, or a
/// scalar variable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ObjBind {
    ObjLoc(Loc),
    ObjVar(Var),
}

/// Statically-known fact about a variable, used by `analysis.rs` (C6).
/// Absence of an entry means "unknown", never "false" — see `spec.md` §9.
#[derive(Clone, Debug, PartialEq)]
pub enum AnalBind {
    Bool(bool),
    Const(Field),
    Bot,
}

/// The elaborator's mutable state, created once per compilation and
/// consumed by value through `Comp`'s combinators (see `comp.rs`).
#[derive(Debug)]
pub struct Env {
    params: FieldParams,
    next_var: usize,
    next_loc: usize,
    /// Declaration-reverse order: each new input is pushed to the front,
    /// O(1), mirroring the cons-list `v : inputs` of the source design; use
    /// `input_vars` to get declaration order.
    inputs_rev: VecDeque<Var>,
    obj_map: HashMap<(Loc, usize), ObjBind>,
    anal_map: HashMap<Var, AnalBind>,
}

impl Env {
    pub fn new(params: FieldParams) -> Env {
        Env {
            params,
            next_var: 0,
            next_loc: 0,
            inputs_rev: VecDeque::new(),
            obj_map: HashMap::new(),
            anal_map: HashMap::new(),
        }
    }

    pub fn params(&self) -> &FieldParams {
        &self.params
    }

    pub fn num_vars(&self) -> usize {
        self.next_var
    }

    /// Allocates a fresh `Var`, monotonically, never reused.
    pub fn fresh_var(&mut self) -> Var {
        let v = Var(self.next_var);
        self.next_var += 1;
        debug!(var = v.0, "fresh_var");
        v
    }

    /// Allocates a fresh `Var` and records it as user-supplied input.
    pub fn fresh_input(&mut self) -> Var {
        let v = self.fresh_var();
        self.inputs_rev.push_front(v);
        v
    }

    /// Allocates a fresh `Loc`, monotonically, never reused.
    pub fn fresh_loc(&mut self) -> Loc {
        let l = Loc(self.next_loc);
        self.next_loc += 1;
        debug!(loc = l.0, "fresh_loc");
        l
    }

    /// Variables designated as user-supplied, in declaration order. The
    /// internal list is kept in reverse declaration order; this reverses it
    /// once for external consumption (`spec.md` §9, Input ordering).
    pub fn input_vars(&self) -> Vec<Var> {
        self.inputs_rev.iter().rev().copied().collect()
    }

    pub fn obj_bind(&mut self, loc: Loc, index: usize, bind: ObjBind) {
        if let ObjBind::ObjLoc(target) = &bind {
            debug_assert!(target.0 < loc.0, "heap binding must not reference a later location");
        }
        self.obj_map.insert((loc, index), bind);
    }

    pub fn obj_lookup(&self, loc: Loc, index: usize) -> Result<&ObjBind, ElabError> {
        self.obj_map.get(&(loc, index)).ok_or(ElabError::UnboundIndex)
    }

    pub fn anal_set(&mut self, v: Var, bind: AnalBind) {
        self.anal_map.insert(v, bind);
    }

    pub fn anal_get(&self, v: Var) -> Option<&AnalBind> {
        self.anal_map.get(&v)
    }
}
