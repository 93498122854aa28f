//! Provider error taxonomy
//!
//! Every failure surfaces as exactly one [`QueryError`] variant with
//! its original cause intact. Wrapping introduced by asynchronous
//! machinery (join handles, aggregates) is never observable; the
//! blocking and async entry points yield identical error types.

use thiserror::Error;

use crate::executor::SearchError;
use crate::request::TranslateError;
use crate::response::{CastError, MaterializeError};

/// Result type for provider operations
pub type ProviderResult<T> = Result<T, QueryError>;

/// Failures surfaced by query execution and query construction
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// A required input was absent or unusable at a call boundary
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// A runtime type could not be reconciled with the expected shape
    #[error("incompatible query shape: expected {expected}, got {actual}")]
    IncompatibleShape {
        expected: &'static str,
        actual: &'static str,
    },

    /// The execution path completed without producing a response
    #[error("no response received from search executor")]
    NoResponse,

    /// The caller's token was cancelled while I/O was outstanding
    #[error("query execution was cancelled")]
    Cancelled,

    /// Translation rejected the query description
    #[error(transparent)]
    Translate(#[from] TranslateError),

    /// Materialization rejected the response
    #[error(transparent)]
    Materialize(#[from] MaterializeError),

    /// The materialized value is not assignable to the requested shape
    #[error(transparent)]
    InvalidCast(#[from] CastError),

    /// The executor failed; the original failure is carried as-is
    #[error(transparent)]
    Search(SearchError),
}

impl From<SearchError> for QueryError {
    fn from(error: SearchError) -> Self {
        match error {
            // Cancellation is a distinct signal, not an ordinary failure
            SearchError::Cancelled => QueryError::Cancelled,
            other => QueryError::Search(other),
        }
    }
}
