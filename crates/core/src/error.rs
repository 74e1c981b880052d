//! Identifier error model.

use thiserror::Error;

/// Failure to construct an identifier from untrusted input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdError {
    /// The identifier was empty (or whitespace only).
    #[error("{0} must not be empty")]
    Empty(&'static str),
}
