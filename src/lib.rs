//! An elaborator and R1CS compiler for a small typed arithmetic/boolean
//! DSL, embedded in Rust as a combinator library (`Comp`) rather than
//! parsed from source text.
//!
//! A program is built from the combinators in [`api`], elaborated into a
//! [`ast::TExp`] by running it against an [`env::Env`], lowered to an
//! [`bytecode::R1cs`] by [`bytecode::compile`], and (given concrete field
//! inputs) solved for a full variable assignment by [`witness::witness`].
//! [`check`] drives all four stages and reports whether the resulting
//! assignment satisfies the constraint system.

pub mod analysis;
pub mod api;
pub mod ast;
pub mod bytecode;
pub mod comp;
pub mod compound;
pub mod env;
pub mod error;
pub mod field;
pub mod serialize;
pub mod witness;

use ast::TExp;
use bytecode::R1cs;
use comp::Comp;
use env::Env;
use error::CheckError;
use field::{Field, FieldParams};

/// The outcome of elaborating, compiling, and solving a program.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckResult {
    pub r1cs: R1cs,
    pub assignment: Vec<Field>,
    pub satisfied: bool,
    pub outputs: Vec<Field>,
}

/// Runs the full pipeline: elaborate `program` against a fresh [`Env`],
/// compile the result to R1CS, solve a witness for `inputs`, and check
/// satisfiability.
pub fn check(program: Comp, inputs: Vec<Field>, params: FieldParams) -> Result<CheckResult, CheckError> {
    let mut env = Env::new(params);
    let prog: TExp = program.run(&mut env)?;
    let r1cs = bytecode::compile(&prog, &mut env)?;
    let assignment = witness::witness(&prog, &r1cs, &inputs)?;
    let satisfied = witness::sat_r1cs(&assignment, &r1cs);
    let outputs = r1cs.output_vars.iter().map(|&w| assignment[w].clone()).collect();

    Ok(CheckResult { r1cs, assignment, satisfied, outputs })
}

