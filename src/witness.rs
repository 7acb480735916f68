// Witness engine (C8): evaluates a typed expression against concrete field
// inputs to produce a full variable assignment (including the auxiliary
// wires the R1CS compiler introduces), then checks it against the compiled
// constraint system.
//
// This mirrors `bytecode.rs`'s `Compiler` node-for-node rather than solving
// the flattened constraint system generically: each place `Compiler`
// allocates an auxiliary wire, `WitnessGen` allocates the same wire (by
// replaying the identical traversal order) and records its concrete value,
// including the "hint" values (like a division's quotient, or `Eq`'s
// auxiliary inverse) that only make sense computed out-of-circuit.

use crate::ast::{BinOp, Node, TExp, TExpNode, UnOp, Value};
use crate::bytecode::{wire_of, Lc, R1cs};
use crate::error::WitnessError;
use crate::field::{Field, FieldParams};

struct WitnessGen {
    assignment: Vec<Option<Field>>,
    next_wire: usize,
    params: FieldParams,
}

impl WitnessGen {
    fn new(params: FieldParams, num_elab_vars: usize) -> Self {
        let mut assignment = vec![None; num_elab_vars + 1];
        assignment[0] = Some(Field::one(&params));
        WitnessGen { assignment, next_wire: num_elab_vars + 1, params }
    }

    fn set(&mut self, wire: usize, value: Field) {
        if wire >= self.assignment.len() {
            self.assignment.resize(wire + 1, None);
        }
        self.assignment[wire] = Some(value);
    }

    fn get(&self, wire: usize) -> Option<&Field> {
        self.assignment.get(wire).and_then(|v| v.as_ref())
    }

    /// Allocates the next auxiliary wire and records `value` there, mirroring
    /// one `Compiler::fresh_wire` call.
    fn alloc(&mut self, value: Field) -> usize {
        let w = self.next_wire;
        self.next_wire += 1;
        self.set(w, value);
        w
    }

    fn eval(&mut self, e: &TExp) -> Result<Field, WitnessError> {
        match &e.node {
            TExpNode::Val(Value::Unit) => Ok(Field::zero(&self.params)),
            TExpNode::Val(Value::True) => {
                let one = Field::one(&self.params);
                self.alloc(one.clone());
                Ok(one)
            }
            TExpNode::Val(Value::False) => {
                let zero = Field::zero(&self.params);
                self.alloc(zero.clone());
                Ok(zero)
            }
            TExpNode::Val(Value::FieldConst(f)) => {
                self.alloc(f.clone());
                Ok(f.clone())
            }
            TExpNode::Val(Value::LocRef(_)) => {
                Err(WitnessError::InternalInvariant("a bare LocRef has no scalar value"))
            }
            TExpNode::Var(v) => self
                .get(wire_of(*v))
                .cloned()
                .ok_or(WitnessError::UnderDetermined(wire_of(*v))),
            TExpNode::Unop(op, inner) => self.eval_unop(*op, inner),
            TExpNode::Binop(op, l, r) => self.eval_binop(*op, l, r),
            TExpNode::If(c, t, e2) => self.eval_if(c, t, e2),
            TExpNode::Assert(v, rhs) => self.eval_assert(*v, rhs),
            TExpNode::Seq(es) => self.eval_seq(es),
            TExpNode::Bot => Ok(Field::zero(&self.params)),
        }
    }

    fn eval_unop(&mut self, op: UnOp, inner: &TExp) -> Result<Field, WitnessError> {
        let vi = self.eval(inner)?;
        let result = match op {
            UnOp::Neg => vi.neg(),
            UnOp::Not => Field::one(&self.params).sub(&vi),
        };
        self.alloc(result.clone());
        Ok(result)
    }

    fn eval_binop(&mut self, op: BinOp, l: &TExp, r: &TExp) -> Result<Field, WitnessError> {
        let vl = self.eval(l)?;
        let vr = self.eval(r)?;
        let result = match op {
            BinOp::Add => {
                let v = vl.add(&vr);
                self.alloc(v.clone());
                v
            }
            BinOp::Sub => {
                let v = vl.sub(&vr);
                self.alloc(v.clone());
                v
            }
            BinOp::Mul | BinOp::And => {
                let v = vl.mul(&vr);
                self.alloc(v.clone());
                v
            }
            BinOp::Div => {
                let v = vl.div(&vr)?;
                self.alloc(v.clone());
                v
            }
            BinOp::Or => {
                let p = vl.mul(&vr);
                self.alloc(p.clone());
                let v = vl.add(&vr).sub(&p);
                self.alloc(v.clone());
                v
            }
            BinOp::XOr => {
                let p = vl.mul(&vr);
                self.alloc(p.clone());
                let two = Field::from_i64(2, &self.params);
                let v = vl.add(&vr).sub(&two.mul(&p));
                self.alloc(v.clone());
                v
            }
            BinOp::Eq | BinOp::BEq => return self.eval_eq(&vl, &vr),
        };
        Ok(result)
    }

    /// `d = V_a - V_b`; the hint is `w = d⁻¹` (or `0` if `d = 0`) and
    /// `V_e = 1` iff `d = 0` — values a circuit cannot derive from the
    /// constraints alone.
    fn eval_eq(&mut self, vl: &Field, vr: &Field) -> Result<Field, WitnessError> {
        let d = vl.sub(vr);
        let (w, ve) = if d.is_zero() {
            (Field::zero(&self.params), Field::one(&self.params))
        } else {
            (d.inv()?, Field::zero(&self.params))
        };
        self.alloc(w);
        self.alloc(ve.clone());
        Ok(ve)
    }

    fn eval_if(&mut self, c: &TExp, t: &TExp, e: &TExp) -> Result<Field, WitnessError> {
        let vc = self.eval(c)?;
        let vt = self.eval(t)?;
        let ve_else = self.eval(e)?;
        let p = vc.mul(&vt.sub(&ve_else));
        self.alloc(p.clone());
        let result = ve_else.add(&p);
        self.alloc(result.clone());
        Ok(result)
    }

    fn eval_assert(&mut self, v: crate::ast::Var, rhs: &TExp) -> Result<Field, WitnessError> {
        let value = self.eval(rhs)?;
        let wire = wire_of(v);
        if let Some(existing) = self.get(wire) {
            if *existing != value {
                return Err(WitnessError::Overdetermined(wire));
            }
        }
        self.set(wire, value);
        Ok(Field::zero(&self.params))
    }

    fn eval_seq(&mut self, es: &[Node<TExp>]) -> Result<Field, WitnessError> {
        let mut last = Field::zero(&self.params);
        for e in es {
            last = self.eval(e)?;
        }
        Ok(last)
    }

    fn finish(self, num_vars: usize) -> Result<Vec<Field>, WitnessError> {
        let mut out = Vec::with_capacity(num_vars);
        for wire in 0..num_vars {
            match self.assignment.get(wire).and_then(|v| v.clone()) {
                Some(f) => out.push(f),
                None => return Err(WitnessError::UnderDetermined(wire)),
            }
        }
        Ok(out)
    }
}

/// Evaluates `prog` against `inputs` (in declaration order) to produce a
/// full assignment over every wire in `r1cs`, including auxiliary wires.
pub fn witness(prog: &TExp, r1cs: &R1cs, inputs: &[Field]) -> Result<Vec<Field>, WitnessError> {
    if inputs.len() != r1cs.input_vars.len() {
        return Err(WitnessError::InputArityMismatch {
            expected: r1cs.input_vars.len(),
            got: inputs.len(),
        });
    }

    let mut gen = WitnessGen::new(r1cs.params.clone(), r1cs.num_elab_vars);
    for (wire, value) in r1cs.input_vars.iter().zip(inputs) {
        gen.set(*wire, value.clone());
    }
    gen.eval(prog)?;
    gen.finish(r1cs.num_vars)
}

fn eval_lc(lc: &Lc, assignment: &[Field], params: &FieldParams) -> Field {
    lc.iter().fold(Field::zero(params), |acc, (coeff, wire)| acc.add(&coeff.mul(&assignment[*wire])))
}

/// Checks a full wire assignment against every constraint in `r1cs`.
pub fn sat_r1cs(assignment: &[Field], r1cs: &R1cs) -> bool {
    r1cs.constraints.iter().all(|constraint| {
        let a = eval_lc(&constraint.a, assignment, &r1cs.params);
        let b = eval_lc(&constraint.b, assignment, &r1cs.params);
        let c = eval_lc(&constraint.c, assignment, &r1cs.params);
        a.mul(&b) == c
    })
}
