use thiserror::Error;

/// Errors produced while replaying or checking a commitment proof.
///
/// Internal routines (`apply_leaf`, `calculate_existence_root`,
/// `verify_existence`, `verify_non_existence`, `ensure_spec`, `compress`,
/// `decompress`) fail hard with one of these. The top-level API
/// (`verify_membership`, `verify_non_membership`, the batch variants, and
/// `verify_webcat_proof`) catches all of them and collapses the result to a
/// boolean (or, for the sidecar, an `Option`) -- never propagate a
/// `VerifyError` across that boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    #[error("malformed proof: {0}")]
    MalformedProof(String),

    #[error("spec violation: {0}")]
    SpecViolation(String),

    #[error("root mismatch: computed root does not match supplied root")]
    RootMismatch,

    #[error("key/value mismatch: proof does not match the queried key or value")]
    KeyValueMismatch,

    #[error("ordering violation: {0}")]
    OrderingViolation(String),

    #[error("unsupported operator: {0}")]
    UnsupportedOperator(String),

    #[error("invalid encoding: {0}")]
    InvalidEncoding(String),
}

pub type VerifyResult<T> = Result<T, VerifyError>;
