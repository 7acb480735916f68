// Error kinds for elaboration, R1CS lowering, and witness solving.

use thiserror::Error;

/// Errors raised while building a program inside the `Comp` monad (C2–C6).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ElabError {
    #[error("array allocation requires length >= 1")]
    ZeroSizedArray,

    #[error("get/set target is not a heap location")]
    NotALocation,

    #[error("no binding for heap index")]
    UnboundIndex,

    #[error("division by zero")]
    DivByZero,

    #[error("internal invariant violated: {0}")]
    InternalInvariant(&'static str),
}

/// Errors raised while lowering a typed expression to R1CS (C7).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    #[error("elaboration failed: {0}")]
    Elab(#[from] ElabError),

    #[error("internal invariant violated during compilation: {0}")]
    InternalInvariant(&'static str),
}

/// Errors raised while solving for a witness or checking satisfiability (C8).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WitnessError {
    #[error("expected {expected} input values, got {got}")]
    InputArityMismatch { expected: usize, got: usize },

    #[error("division by zero")]
    DivByZero,

    #[error("variable {0} is not determined by the constraint system")]
    UnderDetermined(usize),

    #[error("variable {0} is assigned conflicting values")]
    Overdetermined(usize),

    #[error("internal invariant violated during witness generation: {0}")]
    InternalInvariant(&'static str),
}

/// Errors raised while parsing a serialized R1CS (C9).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SerializeError {
    #[error("malformed r1cs text at line {0}: {1}")]
    Malformed(usize, String),
}

/// Top-level error returned by [`crate::check`], unifying every stage.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckError {
    #[error(transparent)]
    Elab(#[from] ElabError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Witness(#[from] WitnessError),
}
