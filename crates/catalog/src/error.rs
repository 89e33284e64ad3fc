//! Error types for the catalog crate.
//!
//! Loading a catalog can fail on I/O, on a malformed `.dat` line, or on a
//! JSON document that does not have the TMDb shape.

use thiserror::Error;

/// Errors that can occur while reading a movie catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    /// File could not be found or opened
    #[error("Failed to open catalog file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Line in a `.dat` catalog couldn't be parsed
    ///
    /// Carries enough context to point at the offending line.
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// A JSON catalog did not decode
    #[error("Invalid JSON catalog {file}: {source}")]
    JsonError {
        file: String,
        #[source]
        source: serde_json::Error,
    },

    /// File extension is neither `.dat` nor `.json`
    #[error("Unsupported catalog format: {path}")]
    UnsupportedFormat { path: String },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, CatalogError>;
