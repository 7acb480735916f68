// Compound value layer (C5): arrays and pairs, allocated on the
// elaborator's heap and always referenced through a `Loc` (the
// compound-by-reference invariant in `spec.md` §3).
//
// Grounded on the teacher's `typechecker.rs` `eval_list`/`eval_map`/
// `eval_index`/`eval_dot`, which walk a compound value's structure the same
// shape this module does — generalized from "compute the type of" to
// "compute the heap binding for".

use crate::analysis::record_assert;
use crate::ast::{Node, TExp, TExpNode, Ty, Value};
use crate::comp::Comp;
use crate::env::ObjBind;
use crate::error::ElabError;

fn component_ty(ty: &Ty, index: usize) -> Ty {
    match ty {
        Ty::Arr(elem) => (**elem).clone(),
        Ty::Prod(t0, t1) => if index == 0 { (**t0).clone() } else { (**t1).clone() },
        other => other.clone(),
    }
}

/// `arr(len) -> TExp[Arr τ]`: fails `ZeroSizedArray` when `len = 0`.
pub fn arr(len: usize, elem_ty: Ty) -> Comp {
    if len == 0 {
        return Comp::raise(ElabError::ZeroSizedArray);
    }
    Comp::new(move |env| {
        let loc = env.fresh_loc();
        for i in 0..len {
            let v = env.fresh_var();
            env.obj_bind(loc, i, ObjBind::ObjVar(v));
        }
        Ok(TExp::loc_ref(Ty::arr(elem_ty), loc))
    })
}

/// `input_arr(len)`: like `arr`, but each component is additionally pushed
/// onto `inputs`, in declaration order of indices.
pub fn input_arr(len: usize, elem_ty: Ty) -> Comp {
    if len == 0 {
        return Comp::raise(ElabError::ZeroSizedArray);
    }
    Comp::new(move |env| {
        let loc = env.fresh_loc();
        for i in 0..len {
            let v = env.fresh_input();
            env.obj_bind(loc, i, ObjBind::ObjVar(v));
        }
        Ok(TExp::loc_ref(Ty::arr(elem_ty), loc))
    })
}

/// `get(a, i) -> TExp[τ]`.
pub fn get(a: TExp, i: usize) -> Comp {
    Comp::new(move |env| {
        let result_ty = component_ty(&a.ty, i);
        if a.is_bot() {
            return Ok(TExp::bot(result_ty));
        }
        let loc = a.loc_of().ok_or(ElabError::NotALocation)?;
        match env.obj_lookup(loc, i)?.clone() {
            ObjBind::ObjLoc(l2) => Ok(TExp::loc_ref(result_ty, l2)),
            ObjBind::ObjVar(v) => Ok(TExp::var(result_ty, v)),
        }
    })
}

/// `get2(a, i, j)`: sugar for `get(get(a, i), j)` — there is no flat 2D
/// array representation, only nested compound values (`spec.md` §9).
pub fn get2(a: TExp, i: usize, j: usize) -> Comp {
    get(a, i).bind(move |inner| get(inner, j))
}

/// `set(a, i, e) -> TExp[Unit]`.
pub fn set(a: TExp, i: usize, e: TExp) -> Comp {
    Comp::new(move |env| {
        if a.is_bot() {
            return Ok(TExp::bot(Ty::Unit));
        }
        let loc = a.loc_of().ok_or(ElabError::NotALocation)?;

        if e.is_bot() {
            return Ok(TExp::bot(Ty::Unit));
        }

        match &e.node {
            TExpNode::Var(v) => {
                env.obj_bind(loc, i, ObjBind::ObjVar(*v));
                Ok(TExp::unit())
            }
            TExpNode::Val(Value::LocRef(l2)) => {
                env.obj_bind(loc, i, ObjBind::ObjLoc(*l2));
                Ok(TExp::unit())
            }
            _ => {
                let v = env.fresh_var();
                env.obj_bind(loc, i, ObjBind::ObjVar(v));
                record_assert(env, v, &e);
                Ok(TExp { ty: Ty::Unit, node: TExpNode::Assert(v, Node::new(e)) })
            }
        }
    })
}

/// `pair(e1, e2)`: allocates a fresh `Loc` and installs bindings at indices
/// 0 and 1. Unlike `set`, every non-`LocRef` component gets a fresh
/// variable — there is no "already a `Var`" fast path here (`spec.md` §4.5).
pub fn pair(e1: TExp, e2: TExp) -> Comp {
    Comp::new(move |env| {
        let ty = Ty::prod(e1.ty.clone(), e2.ty.clone());
        let loc = env.fresh_loc();
        let mut asserts: Option<TExp> = None;
        for (i, component) in [e1, e2].into_iter().enumerate() {
            match &component.node {
                TExpNode::Val(Value::LocRef(l2)) => {
                    env.obj_bind(loc, i, ObjBind::ObjLoc(*l2));
                }
                _ => {
                    let v = env.fresh_var();
                    env.obj_bind(loc, i, ObjBind::ObjVar(v));
                    record_assert(env, v, &component);
                    let assert_node = TExp { ty: Ty::Unit, node: TExpNode::Assert(v, Node::new(component)) };
                    asserts = Some(match asserts {
                        Some(prev) => crate::comp::seq(prev, assert_node),
                        None => assert_node,
                    });
                }
            }
        }
        let result = TExp::loc_ref(ty, loc);
        Ok(match asserts {
            Some(prefix) => crate::comp::seq(prefix, result),
            None => result,
        })
    })
}

/// `fst(p)` / `snd(p)`: `Bot` propagates; otherwise `get(p, 0)` / `get(p, 1)`.
pub fn fst(p: TExp) -> Comp {
    get(p, 0)
}

pub fn snd(p: TExp) -> Comp {
    get(p, 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldParams;
    use pretty_assertions::assert_eq;

    fn run(c: Comp) -> TExp {
        let mut env = crate::env::Env::new(FieldParams::default());
        c.run(&mut env).expect("comp should not fail")
    }

    #[test]
    fn test_zero_length_array_fails() {
        let mut env = crate::env::Env::new(FieldParams::default());
        let err = arr(0, Ty::Field).run(&mut env).unwrap_err();
        assert_eq!(err, ElabError::ZeroSizedArray);
    }

    #[test]
    fn test_set_then_get_same_value() {
        let mut env = crate::env::Env::new(FieldParams::default());
        let a = arr(3, Ty::Field).run(&mut env).unwrap();
        let v = env.fresh_var();
        let rhs = TExp::var(Ty::Field, v);
        set(a.clone(), 1, rhs.clone()).run(&mut env).unwrap();
        let fetched = get(a, 1).run(&mut env).unwrap();
        assert_eq!(fetched, rhs);
    }

    #[test]
    fn test_get_out_of_bounds_is_unbound_index() {
        let mut env = crate::env::Env::new(FieldParams::default());
        let a = arr(2, Ty::Field).run(&mut env).unwrap();
        let err = get(a, 5).run(&mut env).unwrap_err();
        assert_eq!(err, ElabError::UnboundIndex);
    }

    #[test]
    fn test_set_non_location_fails() {
        let e = run(Comp::pure(TExp::bool_lit(true)));
        let mut env = crate::env::Env::new(FieldParams::default());
        let err = set(e, 0, TExp::bool_lit(false)).run(&mut env).unwrap_err();
        assert_eq!(err, ElabError::NotALocation);
    }

    #[test]
    fn test_pair_fst_snd() {
        // `pair` always materializes each component into a fresh variable
        // (see its doc comment), so `fst`/`snd` return *new* `Var` nodes of
        // the right type and heap indices rather than the original ones.
        let mut env = crate::env::Env::new(FieldParams::default());
        let va = env.fresh_var();
        let vb = env.fresh_var();
        let ea = TExp::var(Ty::Field, va);
        let eb = TExp::var(Ty::Bool, vb);
        let p = pair(ea, eb).run(&mut env).unwrap();
        let got_fst = fst(p.clone()).run(&mut env).unwrap();
        let got_snd = snd(p).run(&mut env).unwrap();
        assert_eq!(got_fst.ty, Ty::Field);
        assert!(matches!(got_fst.node, TExpNode::Var(_)));
        assert_eq!(got_snd.ty, Ty::Bool);
        assert!(matches!(got_snd.node, TExpNode::Var(_)));
    }

    #[test]
    fn test_bot_propagates_through_get() {
        let bot_arr = TExp::bot(Ty::arr(Ty::Field));
        assert!(run(get(bot_arr, 0)).is_bot());
    }

    #[test]
    fn test_get2_is_nested_get() {
        let mut env = crate::env::Env::new(FieldParams::default());
        let inner = arr(2, Ty::Field).run(&mut env).unwrap();
        let v = env.fresh_var();
        set(inner.clone(), 1, TExp::var(Ty::Field, v)).run(&mut env).unwrap();
        let outer = arr(2, Ty::arr(Ty::Field)).run(&mut env).unwrap();
        set(outer.clone(), 0, inner).run(&mut env).unwrap();
        let got = get2(outer, 0, 1).run(&mut env).unwrap();
        assert_eq!(got, TExp::var(Ty::Field, v));
    }
}
