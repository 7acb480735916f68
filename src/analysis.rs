// Static analysis & bottom (C6): the optimistic `AnalMap` and the
// `is_true`/`is_false`/`is_bot` query predicates used by `if`-elaboration
// pruning and assertion simplification.
//
// Grounded on the teacher's `typechecker.rs` `eval_cond`, which inspects a
// sub-expression's statically-known shape before deciding how to proceed;
// here the "shape" is a constant-propagation fact rather than a type.

use crate::ast::{TExp, TExpNode, Value, Var};
use crate::env::{AnalBind, Env};

/// On `Assert(Var(v), e)`: if `e` resolves to a known constant, boolean, or
/// `Bot`, record the corresponding fact for `v`. Absence of a fact never
/// implies its negation (`spec.md` §9) — we only ever *add* bindings here.
pub fn record_assert(env: &mut Env, v: Var, e: &TExp) {
    if let Some(bind) = static_bind(e) {
        env.anal_set(v, bind);
    }
}

fn static_bind(e: &TExp) -> Option<AnalBind> {
    match &e.node {
        TExpNode::Val(Value::True) => Some(AnalBind::Bool(true)),
        TExpNode::Val(Value::False) => Some(AnalBind::Bool(false)),
        TExpNode::Val(Value::FieldConst(f)) => Some(AnalBind::Const(f.clone())),
        TExpNode::Bot => Some(AnalBind::Bot),
        _ => None,
    }
}

/// Literal `True`: immediate. `Var`: consult `AnalMap`, absent ⇒ `false`.
/// `Unop`/`Binop`/`Seq`: never statically `true` (only literals and
/// known-true variables are).
pub fn is_true(env: &Env, e: &TExp) -> bool {
    match &e.node {
        TExpNode::Val(Value::True) => true,
        TExpNode::Var(v) => var_is_true(env, *v),
        _ => false,
    }
}

pub fn is_false(env: &Env, e: &TExp) -> bool {
    match &e.node {
        TExpNode::Val(Value::False) => true,
        TExpNode::Var(v) => var_is_false(env, *v),
        _ => false,
    }
}

/// `is_bot` propagates through any operand, unlike `is_true`/`is_false`.
pub fn is_bot(env: &Env, e: &TExp) -> bool {
    match &e.node {
        TExpNode::Bot => true,
        TExpNode::Var(v) => var_is_bot(env, *v),
        TExpNode::Unop(_, a) => is_bot(env, a),
        TExpNode::Binop(_, a, b) => is_bot(env, a) || is_bot(env, b),
        TExpNode::Seq(es) => es.iter().any(|e| is_bot(env, e)),
        _ => false,
    }
}

/// Queries the recorded fact for a variable, consulting `AnalMap`.
pub fn var_is_true(env: &Env, v: Var) -> bool {
    matches!(env.anal_get(v), Some(AnalBind::Bool(true)))
}

pub fn var_is_false(env: &Env, v: Var) -> bool {
    matches!(env.anal_get(v), Some(AnalBind::Bool(false)))
}

pub fn var_is_bot(env: &Env, v: Var) -> bool {
    matches!(env.anal_get(v), Some(AnalBind::Bot))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldParams;

    #[test]
    fn test_absence_is_unknown_not_false() {
        let env = Env::new(FieldParams::default());
        let v = Var(0);
        assert!(!var_is_true(&env, v));
        assert!(!var_is_false(&env, v));
    }

    #[test]
    fn test_record_assert_then_query() {
        let mut env = Env::new(FieldParams::default());
        let v = env.fresh_var();
        record_assert(&mut env, v, &TExp::bool_lit(true));
        assert!(var_is_true(&env, v));
        assert!(!var_is_false(&env, v));
    }

    #[test]
    fn test_is_bot_propagates_through_binop() {
        use crate::ast::{BinOp, Node, Ty};
        let env = Env::new(FieldParams::default());
        let bot_operand = TExp::bot(Ty::Field);
        let e = TExp {
            ty: Ty::Field,
            node: TExpNode::Binop(BinOp::Add, Node::new(bot_operand), Node::new(TExp::bool_lit(true))),
        };
        assert!(is_bot(&env, &e));
    }
}
