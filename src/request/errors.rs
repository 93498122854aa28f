//! Translation error types

use thiserror::Error;

/// Result type for translation
pub type TranslateResult<T> = Result<T, TranslateError>;

/// Errors raised while translating a query description
///
/// Translation is pure CPU work; these are detected synchronously and
/// never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslateError {
    /// A criteria leaf referenced an empty field name
    #[error("criteria field name must not be empty")]
    EmptyCriteriaField,

    /// An aggregate operation referenced an empty field name
    #[error("aggregate field name must not be empty")]
    EmptyAggregateField,
}
