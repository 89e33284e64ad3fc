//! Error types for the title index.
//!
//! Absent results (missing prefix path, unknown id, removing a pair that was
//! never inserted) are not errors: they come back as empty vectors, `None`,
//! or `false`.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndexError {
    /// Caller passed a value the operation cannot accept. Nothing was mutated.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An internal invariant was found broken at `path`.
    ///
    /// The index refuses every later operation once this has been reported.
    #[error("Index inconsistency at '{path}': {reason}")]
    Inconsistent { path: String, reason: String },

    /// A previous inconsistency poisoned the index
    #[error("Index is poisoned by an earlier inconsistency; clear it before reuse")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, IndexError>;

/// Convert a limit coming from an outer layer (query string, CLI) into the
/// unsigned limit the query engines take.
pub fn limit_from_signed(raw: i64) -> Result<usize> {
    usize::try_from(raw)
        .map_err(|_| IndexError::InvalidArgument(format!("limit must be non-negative, got {raw}")))
}
