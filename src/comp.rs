// The elaboration monad `Comp` (C4).
//
// `Comp` is a computation that threads a single mutable `Env` and produces a
// `TExp`, short-circuiting on `ElabError`. It plays the role the teacher's
// `TypeChecker` plays for its environment-threading `eval_*` methods, except
// here the "environment" is mutable elaboration state rather than a
// read-only scope chain, and the monad's own combinators (not a method per
// AST node) do the sequencing.

use tracing::trace;

use crate::ast::{BinOp, Node, TExp, TExpNode, Ty, UnOp, Var};
use crate::env::Env;
use crate::error::ElabError;
use crate::field::Field;

type Thunk = Box<dyn FnOnce(&mut Env) -> Result<TExp, ElabError>>;

pub struct Comp {
    run: Thunk,
}

impl Comp {
    pub fn new(f: impl FnOnce(&mut Env) -> Result<TExp, ElabError> + 'static) -> Comp {
        Comp { run: Box::new(f) }
    }

    /// Returns `Seq`-normalised `e` without touching `Env`.
    pub fn pure(e: TExp) -> Comp {
        Comp::new(move |_env| Ok(e))
    }

    /// Abandons the computation; downstream combinators short-circuit.
    pub fn raise(err: ElabError) -> Comp {
        Comp::new(move |_env| Err(err))
    }

    pub fn run(self, env: &mut Env) -> Result<TExp, ElabError> {
        (self.run)(env)
    }

    /// Runs `self`, passes its result expression to `k`, runs `k`'s
    /// computation, and glues the two result expressions with the smart
    /// `seq` constructor.
    pub fn bind(self, k: impl FnOnce(TExp) -> Comp + 'static) -> Comp {
        Comp::new(move |env| {
            let e1 = self.run(env)?;
            let e2 = k(e1.clone()).run(env)?;
            Ok(seq(e1, e2))
        })
    }

    /// Runs `self` for effect, discards its result unless it is impure, then
    /// runs `next`.
    pub fn then(self, next: Comp) -> Comp {
        self.bind(move |_| next)
    }

    pub fn map(self, f: impl FnOnce(TExp) -> TExp + 'static) -> Comp {
        self.bind(move |e| Comp::pure(f(e)))
    }
}

/// Smart `Seq` constructor: flattens nested `Seq`s, drops pure prefix terms,
/// and propagates `Bot` (absorbing under `Seq`).
pub fn seq(left: TExp, right: TExp) -> TExp {
    if left.is_bot() || right.is_bot() {
        return TExp::bot(right.ty.clone());
    }

    let mut elems: Vec<Node<TExp>> = match left.node {
        TExpNode::Seq(es) => es,
        _ => vec![Node::new(left)],
    };
    elems.push(Node::new(right));

    // `last(le)` is always safe: we just pushed `right`, so `elems` is
    // non-empty by construction.
    let last = elems.pop().expect("seq always has at least one element");
    let mut kept: Vec<Node<TExp>> = elems.into_iter().filter(|e| !e.is_pure()).collect();
    kept.push(last);

    if kept.len() == 1 {
        let only = kept.pop().expect("just pushed one element");
        Node::try_unwrap(only).unwrap_or_else(|rc| (*rc).clone())
    } else {
        let ty = kept.last().expect("kept is non-empty").ty.clone();
        TExp { ty, node: TExpNode::Seq(kept) }
    }
}

/// Builds a `Unop` node, propagating `Bot` (absorbing under `Unop`).
pub fn unop(op: UnOp, ty: Ty, e: TExp) -> TExp {
    if e.is_bot() {
        return TExp::bot(ty);
    }
    TExp { ty, node: TExpNode::Unop(op, Node::new(e)) }
}

/// Builds a `Binop` node, propagating `Bot` (absorbing under `Binop`).
pub fn binop(op: BinOp, ty: Ty, l: TExp, r: TExp) -> TExp {
    if l.is_bot() || r.is_bot() {
        return TExp::bot(ty);
    }
    TExp { ty, node: TExpNode::Binop(op, Node::new(l), Node::new(r)) }
}

/// `fresh_var() -> TExp` (§4.3): allocates a fresh `Var` of the given type.
pub fn fresh_var(ty: Ty) -> Comp {
    Comp::new(move |env| {
        let v = env.fresh_var();
        trace!(var = v.0, ?ty, "fresh_var");
        Ok(TExp::var(ty, v))
    })
}

/// `fresh_input() -> TExp` (§4.3): like `fresh_var`, additionally recorded
/// as user-supplied input.
pub fn fresh_input(ty: Ty) -> Comp {
    Comp::new(move |env| {
        let v = env.fresh_input();
        trace!(var = v.0, ?ty, "fresh_input");
        Ok(TExp::var(ty, v))
    })
}

/// `fresh_loc() -> TExp` (§4.3): allocates a fresh `Loc` and wraps it as a
/// `LocRef` of the given compound type.
pub fn fresh_loc(ty: Ty) -> Comp {
    Comp::new(move |env| {
        let l = env.fresh_loc();
        trace!(loc = l.0, ?ty, "fresh_loc");
        Ok(TExp::loc_ref(ty, l))
    })
}

/// `Assert(var, e)` — asserts `var ≡ e`, applying the static-analysis
/// update described in `analysis.rs`.
pub fn assert_var(v: Var, e: TExp) -> Comp {
    Comp::new(move |env| {
        if e.is_bot() {
            return Ok(TExp::bot(Ty::Unit));
        }
        crate::analysis::record_assert(env, v, &e);
        Ok(TExp { ty: Ty::Unit, node: TExpNode::Assert(v, Node::new(e)) })
    })
}

pub fn field_const(v: i64) -> Comp {
    Comp::new(move |env| Ok(TExp::field_const(Field::from_i64(v, env.params()))))
}

/// A rational literal `num/den`, lowered to the `FieldConst` it embeds as
/// (`spec.md` §6: "integer and rational literals lower to `FieldConst`").
pub fn rational_const(num: i64, den: i64) -> Comp {
    Comp::new(move |env| {
        let n = Field::from_i64(num, env.params());
        let d = Field::from_i64(den, env.params());
        let v = n.div(&d).map_err(|_| ElabError::DivByZero)?;
        Ok(TExp::field_const(v))
    })
}

pub fn bool_lit(b: bool) -> Comp {
    Comp::pure(TExp::bool_lit(b))
}

/// `If(cond, then, else)` with static pruning (C6): branches are thunks so
/// that pruning skips their effects entirely.
pub fn if_then_else(
    cond: Comp,
    then_branch: impl FnOnce() -> Comp + 'static,
    else_branch: impl FnOnce() -> Comp + 'static,
) -> Comp {
    cond.bind(move |c| {
        Comp::new(move |env| {
            if crate::analysis::is_true(env, &c) {
                return then_branch().run(env);
            }
            if crate::analysis::is_false(env, &c) {
                return else_branch().run(env);
            }
            if crate::analysis::is_bot(env, &c) {
                return Ok(TExp::bot(Ty::Unit));
            }

            let t = then_branch().run(env)?;
            let e = else_branch().run(env)?;
            if t.ty != e.ty {
                return Err(ElabError::InternalInvariant("if branches must share a type"));
            }
            let ty = t.ty.clone();
            Ok(TExp { ty, node: TExpNode::If(Node::new(c), Node::new(t), Node::new(e)) })
        })
    })
}
