// Public programmatic surface (§4.9 "External interfaces" in spec.md):
// ergonomic combinators over `Comp`, composing `comp.rs` and `compound.rs`
// the way a caller actually writes a program, rather than hand-building
// `TExp` nodes.

use crate::ast::{BinOp, TExp, Ty, UnOp};
use crate::comp::{binop, seq, unop, Comp};

pub use crate::comp::{bool_lit, field_const, fresh_input, fresh_loc, fresh_var, if_then_else, rational_const};
pub use crate::compound::{arr, fst, get, get2, input_arr, pair, set, snd};

fn binop2(op: BinOp, ty: Ty, a: Comp, b: Comp) -> Comp {
    a.bind(move |ea| b.bind(move |eb| Comp::pure(binop(op, ty, ea, eb))))
}

fn unop1(op: UnOp, ty: Ty, a: Comp) -> Comp {
    a.map(move |ea| unop(op, ty, ea))
}

pub fn add(a: Comp, b: Comp) -> Comp {
    binop2(BinOp::Add, Ty::Field, a, b)
}

pub fn sub(a: Comp, b: Comp) -> Comp {
    binop2(BinOp::Sub, Ty::Field, a, b)
}

pub fn mul(a: Comp, b: Comp) -> Comp {
    binop2(BinOp::Mul, Ty::Field, a, b)
}

pub fn div(a: Comp, b: Comp) -> Comp {
    binop2(BinOp::Div, Ty::Field, a, b)
}

pub fn neg(a: Comp) -> Comp {
    unop1(UnOp::Neg, Ty::Field, a)
}

pub fn and(a: Comp, b: Comp) -> Comp {
    binop2(BinOp::And, Ty::Bool, a, b)
}

pub fn or(a: Comp, b: Comp) -> Comp {
    binop2(BinOp::Or, Ty::Bool, a, b)
}

pub fn xor(a: Comp, b: Comp) -> Comp {
    binop2(BinOp::XOr, Ty::Bool, a, b)
}

pub fn not(a: Comp) -> Comp {
    unop1(UnOp::Not, Ty::Bool, a)
}

pub fn eq(a: Comp, b: Comp) -> Comp {
    binop2(BinOp::Eq, Ty::Bool, a, b)
}

pub fn beq(a: Comp, b: Comp) -> Comp {
    binop2(BinOp::BEq, Ty::Bool, a, b)
}

/// Runs `body(i)` for `i` in `0..n`, sequencing effects left to right; the
/// result is whatever the last iteration produces.
pub fn times(n: usize, body: impl Fn(usize) -> Comp) -> Comp {
    assert!(n > 0, "times requires at least one iteration");
    let mut acc = body(0);
    for i in 1..n {
        acc = acc.then(body(i));
    }
    acc
}

/// Sums the `n + 1` field-valued terms `body(0), ..., body(n)` — a sum over
/// the closed range `[0, n]`.
pub fn bigsum(n: usize, body: impl Fn(usize) -> Comp) -> Comp {
    let mut acc = body(0);
    for i in 1..=n {
        acc = add(acc, body(i));
    }
    acc
}

/// `iter(n, f, e0)`: a right fold over `[0, n]` — `f(0, f(1, ..., f(n, e0)))`.
pub fn iter(n: usize, f: impl Fn(usize, Comp) -> Comp, e0: Comp) -> Comp {
    let mut acc = e0;
    for i in (0..=n).rev() {
        acc = f(i, acc);
    }
    acc
}

/// Forces a boolean-valued computation to hold, by binding it and the
/// literal `true` to the same fresh variable — two `Assert`s sharing a
/// wire transitively force the two sides equal.
pub fn assert_true(e: Comp) -> Comp {
    e.bind(|p| {
        Comp::new(move |env| {
            let v = env.fresh_var();
            let bound = crate::comp::assert_var(v, p).run(env)?;
            let pinned = crate::comp::assert_var(v, TExp::bool_lit(true)).run(env)?;
            Ok(seq(bound, pinned))
        })
    })
}

/// Asserts `pred(i)` holds for every `i` in `0..n`.
pub fn forall(n: usize, pred: impl Fn(usize) -> Comp) -> Comp {
    times(n, move |i| assert_true(pred(i)))
}

/// Asserts `pred(i, j)` holds for every `(i, j)` in `0..n x 0..m`.
pub fn forall_pairs(n: usize, m: usize, pred: impl Fn(usize, usize) -> Comp + Clone + 'static) -> Comp {
    times(n, move |i| {
        let pred = pred.clone();
        forall(m, move |j| pred(i, j))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Env;
    use crate::field::FieldParams;
    use pretty_assertions::assert_eq;

    fn run(c: Comp) -> TExp {
        let mut env = Env::new(FieldParams::default());
        c.run(&mut env).expect("comp should not fail")
    }

    #[test]
    fn test_add_two_inputs() {
        let sum = add(fresh_input(Ty::Field), fresh_input(Ty::Field));
        let e = run(sum);
        assert_eq!(e.ty, Ty::Field);
    }

    #[test]
    fn test_bigsum_of_constants() {
        let total = bigsum(3, |i| field_const(i as i64));
        let mut env = Env::new(FieldParams::default());
        let e = total.run(&mut env).unwrap();
        assert_eq!(e.ty, Ty::Field);
    }

    /// `bigsum(n, f)` sums over the closed range `[0, n]`, i.e. `n + 1`
    /// terms — `bigsum(4, ...)` is `0 + 1 + 2 + 3 + 4 = 10`.
    #[test]
    fn test_bigsum_sums_inclusive_range() {
        let params = FieldParams::default();
        let prog = bigsum(4, |i| field_const(i as i64));
        let result = crate::check(prog, vec![], params.clone()).unwrap();
        assert_eq!(result.outputs, vec![crate::field::Field::from_i64(10, &params)]);
    }

    /// `iter(n, f, e0)` is a right fold: `f(0, f(1, f(2, e0)))`.
    #[test]
    fn test_iter_is_a_right_fold() {
        let params = FieldParams::default();
        let prog = iter(2, |i, acc| sub(field_const(i as i64), acc), field_const(0));
        let result = crate::check(prog, vec![], params.clone()).unwrap();
        assert_eq!(result.outputs, vec![crate::field::Field::from_i64(1, &params)]);
    }

    #[test]
    fn test_times_runs_n_iterations() {
        let mut env = Env::new(FieldParams::default());
        let before = env.num_vars();
        times(4, |_| fresh_var(Ty::Field)).run(&mut env).unwrap();
        assert_eq!(env.num_vars(), before + 4);
    }

    #[test]
    fn test_assert_true_on_literal_true_succeeds() {
        let mut env = Env::new(FieldParams::default());
        assert_true(bool_lit(true)).run(&mut env).unwrap();
    }
}
