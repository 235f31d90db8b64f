use thiserror::Error;

/// Errors raised by netuse.
///
/// Recoverable analysis degradations are not errors. They are recorded as
/// [`analysis::Warning`](crate::analysis::Warning) values on the affected
/// module and the analysis continues. `Error` is reserved for conditions that
/// make a requested operation meaningless, such as an invalid dependency
/// order, and for programming-invariant violations.
#[derive(Debug, Error)]
pub enum Error {
    /// A module name was given which is not part of the design.
    #[error("module `{0}` is not part of the design")]
    UnknownModule(String),

    /// The supplied dependency order does not cover the design.
    #[error("invalid dependency order: {0}")]
    DependencyOrder(String),

    /// Serialization of a database table failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// An internal state assumed impossible was reached.
    #[error("invariant violation: {0}")]
    Invariant(String),
}
