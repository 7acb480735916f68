// End-to-end scenarios (S1-S6 from spec.md §8), driven through the public
// `check()` entry point.

use pretty_assertions::assert_eq;

use snarkl_core::api;
use snarkl_core::ast::Ty;
use snarkl_core::comp::Comp;
use snarkl_core::error::{CheckError, WitnessError};
use snarkl_core::field::{Field, FieldParams};
use snarkl_core::check;

fn field(v: i64, params: &FieldParams) -> Field {
    Field::from_i64(v, params)
}

/// S1: `x <- input; return x + x * x`, `[3] -> 12`.
#[test]
fn test_s1_x_plus_x_squared() {
    let params = FieldParams::default();
    let prog = api::fresh_input(Ty::Field).bind(|x| {
        let squared = api::mul(Comp::pure(x.clone()), Comp::pure(x.clone()));
        api::add(Comp::pure(x), squared)
    });
    let result = check(prog, vec![field(3, &params)], params.clone()).unwrap();
    assert!(result.satisfied);
    assert_eq!(result.outputs, vec![field(12, &params)]);
}

/// S2: `a <- input_arr(3); return get(a,0) + get(a,1) + get(a,2)`, `[4,5,6] -> 15`.
#[test]
fn test_s2_array_sum() {
    let params = FieldParams::default();
    let prog = api::input_arr(3, Ty::Field).bind(|arr| {
        let g0 = api::get(arr.clone(), 0);
        let g1 = api::get(arr.clone(), 1);
        let g2 = api::get(arr, 2);
        api::add(api::add(g0, g1), g2)
    });
    let result = check(prog, vec![field(4, &params), field(5, &params), field(6, &params)], params.clone()).unwrap();
    assert!(result.satisfied);
    assert_eq!(result.outputs, vec![field(15, &params)]);
}

fn eq_conditional() -> Comp {
    api::fresh_input(Ty::Field).bind(|x| {
        api::fresh_input(Ty::Field).bind(move |y| {
            let cond = api::eq(Comp::pure(x), Comp::pure(y));
            api::if_then_else(cond, || api::field_const(1), || api::field_const(0))
        })
    })
}

/// S3: same program as S4, `[7,7] -> 1`.
#[test]
fn test_s3_eq_conditional_true() {
    let params = FieldParams::default();
    let result = check(eq_conditional(), vec![field(7, &params), field(7, &params)], params.clone()).unwrap();
    assert!(result.satisfied);
    assert_eq!(result.outputs, vec![field(1, &params)]);
}

/// S4: `x <- input; y <- input; return if eq(x,y) then 1 else 0`, `[7,8] -> 0`.
#[test]
fn test_s4_eq_conditional_false() {
    let params = FieldParams::default();
    let result = check(eq_conditional(), vec![field(7, &params), field(8, &params)], params.clone()).unwrap();
    assert!(result.satisfied);
    assert_eq!(result.outputs, vec![field(0, &params)]);
}

/// S5: `p <- pair(2, 3); return fst(p) * snd(p)`, `[] -> 6`.
#[test]
fn test_s5_pair_fst_times_snd() {
    let params = FieldParams::default();
    let prog = api::field_const(2).bind(|two| {
        api::field_const(3).bind(move |three| {
            api::pair(two, three).bind(|p| api::mul(api::fst(p.clone()), api::snd(p)))
        })
    });
    let result = check(prog, vec![], params.clone()).unwrap();
    assert!(result.satisfied);
    assert_eq!(result.outputs, vec![field(6, &params)]);
}

/// S6: `x <- input; return bigsum 4 (\i -> x * exp_of_int i)`, `[2] -> 20`
/// (the sum of `i*x` for `i` in `0..=4`).
#[test]
fn test_s6_bigsum() {
    let params = FieldParams::default();
    let prog = api::fresh_input(Ty::Field).bind(|x| {
        api::bigsum(4, move |i| api::mul(api::field_const(i as i64), Comp::pure(x.clone())))
    });
    let result = check(prog, vec![field(2, &params)], params.clone()).unwrap();
    assert!(result.satisfied);
    assert_eq!(result.outputs, vec![field(20, &params)]);
}

/// Supplying 2 inputs to a 1-input program fails `InputArityMismatch`.
#[test]
fn test_arity_mismatch_fails() {
    let params = FieldParams::default();
    let prog = api::fresh_input(Ty::Field).bind(|x| {
        let squared = api::mul(Comp::pure(x.clone()), Comp::pure(x.clone()));
        api::add(Comp::pure(x), squared)
    });
    let err = check(prog, vec![field(3, &params), field(4, &params)], params).unwrap_err();
    assert_eq!(err, CheckError::Witness(WitnessError::InputArityMismatch { expected: 1, got: 2 }));
}

/// A `1 / x` node with `x = 0` fails `DivByZero` at witness time.
#[test]
fn test_div_by_zero_at_witness_time() {
    let params = FieldParams::default();
    let prog = api::fresh_input(Ty::Field).bind(|x| api::div(api::field_const(1), Comp::pure(x)));
    let err = check(prog, vec![field(0, &params)], params).unwrap_err();
    assert_eq!(err, CheckError::Witness(WitnessError::DivByZero));
}
