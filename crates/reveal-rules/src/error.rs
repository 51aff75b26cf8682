//! Error type for the rule engine itself, distinct from a `Detection` (a
//! rule finding something wrong with the *target*, not the invocation).

use thiserror::Error;

/// Failures in resolving or running the rule engine.
#[derive(Debug, Error)]
pub enum RuleError {
    /// A `--select`/`--ignore` pattern matched no registered rule code.
    #[error("unknown rule code or prefix: {0:?}")]
    UnknownCode(String),
}

pub type RuleResult<T> = Result<T, RuleError>;
