//! Error types for the synthesizer's fatal I/O path.
//!
//! Synthesis diagnostics (unresolved identifiers, malformed decisions,
//! infeasible atoms, ...) are *not* represented here -- they are data,
//! collected as [`crate::diagnostics::Diagnostic`] values alongside a
//! successful result. `Error` is reserved for the one class of failure
//! the core cannot recover from: reading or deserializing a collaborator
//! document.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal errors from the orchestration layer
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("duplicate symbol in catalog: {0}")]
    DuplicateSymbol(String),

    #[error("{0}")]
    Other(String),
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}
