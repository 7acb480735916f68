// R1CS compiler (C7): lowers a typed expression into a flat list of rank-1
// constraints plus a designated output wire.
//
// This keeps the teacher's `bytecode.rs` slot in the pipeline — the stage
// that lowers a typed tree into a flat target representation for a later
// execution engine — but the target here is a constraint system rather than
// a stack-machine opcode stream, grounded on the sparse `Vec<(F, VarIndex)>`
// row shape used by constraint-system builders elsewhere in the zk-proving
// ecosystem (see DESIGN.md).

use std::collections::HashSet;

use tracing::debug;

use crate::ast::{BinOp, Node, TExp, TExpNode, Ty, UnOp, Value, Var};
use crate::env::Env;
use crate::error::CompileError;
use crate::field::{Field, FieldParams};

/// A sparse affine form over `{1, w0, w1, ...}`; wire `0` is always bound to
/// the constant `1`.
pub type Lc = Vec<(Field, usize)>;

#[derive(Clone, Debug, PartialEq)]
pub struct Constraint {
    pub a: Lc,
    pub b: Lc,
    pub c: Lc,
}

#[derive(Clone, Debug, PartialEq)]
pub struct R1cs {
    pub params: FieldParams,
    pub num_vars: usize,
    /// Variable count right after elaboration, before the compiler added any
    /// auxiliary wires. `witness.rs` needs this to replay the same
    /// allocation order the compiler used.
    pub num_elab_vars: usize,
    pub input_vars: Vec<usize>,
    pub output_vars: Vec<usize>,
    pub constraints: Vec<Constraint>,
}

impl R1cs {
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }
}

/// Wire `0` is reserved for the constant `1`; `Var(v)` lowers to `v.0 + 1`.
pub fn wire_of(v: Var) -> usize {
    v.0 + 1
}

struct Compiler<'a> {
    env: &'a mut Env,
    constraints: Vec<Constraint>,
    bool_range_emitted: HashSet<usize>,
}

impl<'a> Compiler<'a> {
    fn new(env: &'a mut Env) -> Self {
        Compiler { env, constraints: Vec::new(), bool_range_emitted: HashSet::new() }
    }

    fn one(&self) -> Field {
        Field::one(self.env.params())
    }

    fn const_lc(&self, f: Field) -> Lc {
        vec![(f, 0)]
    }

    fn var_lc(&self, wire: usize) -> Lc {
        vec![(self.one(), wire)]
    }

    fn fresh_wire(&mut self) -> usize {
        wire_of(self.env.fresh_var())
    }

    fn emit(&mut self, a: Lc, b: Lc, c: Lc) {
        self.constraints.push(Constraint { a, b, c });
    }

    /// `b * (b - 1) = 0`, emitted at most once per wire (`spec.md` §9).
    fn ensure_bool_range(&mut self, wire: usize) {
        if self.bool_range_emitted.insert(wire) {
            let one = self.one();
            let a = vec![(one.clone(), wire)];
            let b = vec![(one.clone(), wire), (one.neg(), 0)];
            self.emit(a, b, Vec::new());
        }
    }

    /// `A · B = C` where `C` is a fresh wire, returning that wire.
    fn mul_aux(&mut self, a: Lc, b: Lc) -> usize {
        let p = self.fresh_wire();
        let c = self.var_lc(p);
        self.emit(a, b, c);
        p
    }

    /// `terms · 1 = C` where `C` is a fresh wire, returning that wire.
    fn linear(&mut self, terms: Lc) -> usize {
        let w = self.fresh_wire();
        let b = self.const_lc(self.one());
        let c = self.var_lc(w);
        self.emit(terms, b, c);
        w
    }

    fn const_wire(&mut self, value: Field) -> usize {
        let w = self.fresh_wire();
        let a = self.const_lc(value);
        let b = self.const_lc(self.one());
        let c = self.var_lc(w);
        self.emit(a, b, c);
        w
    }

    fn compile(&mut self, e: &TExp) -> Result<usize, CompileError> {
        if e.ty == Ty::Bool {
            if let TExpNode::Var(v) = &e.node {
                self.ensure_bool_range(wire_of(*v));
            }
        }
        match &e.node {
            TExpNode::Val(Value::Unit) => Ok(0),
            TExpNode::Val(Value::True) => {
                let one = self.one();
                Ok(self.const_wire(one))
            }
            TExpNode::Val(Value::False) => {
                let zero = Field::zero(self.env.params());
                Ok(self.const_wire(zero))
            }
            TExpNode::Val(Value::FieldConst(f)) => Ok(self.const_wire(f.clone())),
            TExpNode::Val(Value::LocRef(_)) => {
                Err(CompileError::InternalInvariant("a bare LocRef has no scalar wire"))
            }
            TExpNode::Var(v) => Ok(wire_of(*v)),
            TExpNode::Unop(op, inner) => self.compile_unop(*op, inner),
            TExpNode::Binop(op, l, r) => self.compile_binop(*op, l, r),
            TExpNode::If(c, t, e2) => self.compile_if(c, t, e2),
            TExpNode::Assert(v, rhs) => self.compile_assert(*v, rhs),
            TExpNode::Seq(es) => self.compile_seq(es),
            TExpNode::Bot => Ok(0),
        }
    }

    fn compile_unop(&mut self, op: UnOp, inner: &TExp) -> Result<usize, CompileError> {
        let vi = self.compile(inner)?;
        let one = self.one();
        let w = match op {
            // V_e = -V_i
            UnOp::Neg => self.linear(vec![(one.neg(), vi)]),
            // V_e = 1 - V_i
            UnOp::Not => self.linear(vec![(one.clone(), 0), (one.neg(), vi)]),
        };
        Ok(w)
    }

    fn compile_binop(&mut self, op: BinOp, l: &TExp, r: &TExp) -> Result<usize, CompileError> {
        let vl = self.compile(l)?;
        let vr = self.compile(r)?;
        let one = self.one();
        let w = match op {
            // 1 · (V_a + V_b) = V_e
            BinOp::Add => self.linear(vec![(one.clone(), vl), (one, vr)]),
            // 1 · (V_a - V_b) = V_e
            BinOp::Sub => self.linear(vec![(one.clone(), vl), (one.neg(), vr)]),
            // V_a · V_b = V_e
            BinOp::Mul | BinOp::And => {
                let a = self.var_lc(vl);
                let b = self.var_lc(vr);
                self.mul_aux(a, b)
            }
            // V_b · V_e = V_a
            BinOp::Div => {
                let w = self.fresh_wire();
                let a = self.var_lc(vr);
                let b = self.var_lc(w);
                let c = self.var_lc(vl);
                self.emit(a, b, c);
                w
            }
            // V_e = V_a + V_b - V_a·V_b
            BinOp::Or => {
                let p = self.mul_aux(self.var_lc(vl), self.var_lc(vr));
                self.linear(vec![(one.clone(), vl), (one.clone(), vr), (one.neg(), p)])
            }
            // V_e = V_a + V_b - 2·V_a·V_b
            BinOp::XOr => {
                let p = self.mul_aux(self.var_lc(vl), self.var_lc(vr));
                let neg_two = Field::from_i64(-2, self.env.params());
                self.linear(vec![(one.clone(), vl), (one, vr), (neg_two, p)])
            }
            BinOp::Eq | BinOp::BEq => return self.compile_eq(vl, vr),
        };
        Ok(w)
    }

    /// `d = V_a - V_b`; requires `d·w = 1 - V_e` and `d·V_e = 0`, forcing
    /// `V_e = 1` iff `d = 0` (`spec.md` §4.7).
    fn compile_eq(&mut self, vl: usize, vr: usize) -> Result<usize, CompileError> {
        let one = self.one();
        let d = vec![(one.clone(), vl), (one.clone().neg(), vr)];
        let w = self.fresh_wire();
        let ve = self.fresh_wire();

        let rhs = vec![(one.clone(), 0), (one.neg(), ve)];
        self.emit(d.clone(), self.var_lc(w), rhs);
        self.emit(d, self.var_lc(ve), Vec::new());
        Ok(ve)
    }

    /// `V_e = V_c·V_t + (1−V_c)·V_else`, via the auxiliary
    /// `p = V_c·(V_t − V_else)` and `V_e = V_else + p` (two constraints).
    fn compile_if(&mut self, c: &TExp, t: &TExp, e: &TExp) -> Result<usize, CompileError> {
        let vc = self.compile(c)?;
        let vt = self.compile(t)?;
        let ve_else = self.compile(e)?;
        let one = self.one();
        let diff = vec![(one.clone(), vt), (one.clone().neg(), ve_else)];
        let p = self.mul_aux(self.var_lc(vc), diff);
        Ok(self.linear(vec![(one.clone(), ve_else), (one, p)]))
    }

    /// `(V' − V_e) · 1 = 0`.
    fn compile_assert(&mut self, v: Var, rhs: &TExp) -> Result<usize, CompileError> {
        let rhs_is_bool = rhs.ty == Ty::Bool;
        let ve = self.compile(rhs)?;
        if rhs_is_bool {
            self.ensure_bool_range(wire_of(v));
        }
        let one = self.one();
        let a = vec![(one.clone(), wire_of(v)), (one.clone().neg(), ve)];
        let b = self.const_lc(one);
        self.emit(a, b, Vec::new());
        Ok(0)
    }

    fn compile_seq(&mut self, es: &[Node<TExp>]) -> Result<usize, CompileError> {
        if es.is_empty() {
            return Err(CompileError::InternalInvariant("Seq must carry at least one element"));
        }
        let mut last = 0;
        for e in es {
            last = self.compile(e)?;
        }
        Ok(last)
    }
}

/// Lowers `prog` to an `R1cs` plus the designated output wire, allocating
/// any auxiliary variables the lowering needs through `env`.
pub fn compile(prog: &TExp, env: &mut Env) -> Result<R1cs, CompileError> {
    let input_wires: Vec<usize> = env.input_vars().into_iter().map(wire_of).collect();
    let params = env.params().clone();
    let num_elab_vars = env.num_vars();

    let mut compiler = Compiler::new(env);
    let output = compiler.compile(prog)?;
    let num_vars = compiler.env.num_vars() + 1;

    debug!(num_vars, num_constraints = compiler.constraints.len(), "compiled r1cs");

    Ok(R1cs {
        params,
        num_vars,
        num_elab_vars,
        input_vars: input_wires,
        output_vars: vec![output],
        constraints: compiler.constraints,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn field(v: i64, params: &FieldParams) -> Field {
        Field::from_i64(v, params)
    }

    #[test]
    fn test_every_constraint_wire_in_bounds() {
        let mut env = Env::new(FieldParams::default());
        let x = env.fresh_input();
        let x_exp = TExp::var(Ty::Field, x);
        let sum = crate::comp::binop(BinOp::Add, Ty::Field, x_exp.clone(), x_exp);
        let r1cs = compile(&sum, &mut env).unwrap();

        for constraint in &r1cs.constraints {
            for lc in [&constraint.a, &constraint.b, &constraint.c] {
                for (_, wire) in lc {
                    assert!(*wire < r1cs.num_vars);
                }
            }
        }
    }

    #[test]
    fn test_add_produces_one_linear_constraint() {
        let mut env = Env::new(FieldParams::default());
        let x = env.fresh_input();
        let x_exp = TExp::var(Ty::Field, x);
        let sum = crate::comp::binop(BinOp::Add, Ty::Field, x_exp.clone(), x_exp);
        let r1cs = compile(&sum, &mut env).unwrap();
        assert_eq!(r1cs.num_constraints(), 1);
        let params = FieldParams::default();
        assert_eq!(r1cs.constraints[0].a, vec![(field(1, &params), 1), (field(1, &params), 1)]);
    }

    #[test]
    fn test_assert_emits_equality_constraint() {
        let mut env = Env::new(FieldParams::default());
        let v = env.fresh_var();
        let rhs = TExp::bool_lit(true);
        let assert_node = TExp { ty: Ty::Unit, node: TExpNode::Assert(v, Node::new(rhs)) };
        let r1cs = compile(&assert_node, &mut env).unwrap();
        // const_wire(True) + v's boolean range constraint + the equality constraint
        assert_eq!(r1cs.num_constraints(), 3);
    }

    #[test]
    fn test_boolean_range_constraint_emitted_once() {
        let mut env = Env::new(FieldParams::default());
        let b = env.fresh_input();
        let lhs = TExp::var(Ty::Bool, b);
        let rhs = TExp::var(Ty::Bool, b);
        let both = crate::comp::binop(BinOp::And, Ty::Bool, lhs, rhs);
        let r1cs = compile(&both, &mut env).unwrap();
        // one range constraint (shared by both operand occurrences) + one And constraint
        assert_eq!(r1cs.num_constraints(), 2);
    }
}
