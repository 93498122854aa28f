//! Materialization and narrowing error types

use thiserror::Error;

/// Result type for materialization
pub type MaterializeResult<T> = Result<T, MaterializeError>;

/// Errors raised while converting a raw response into a result value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MaterializeError {
    /// A first/single operation matched no documents
    #[error("sequence contains no matching documents")]
    EmptySequence,

    /// The response is missing an expected aggregate value
    #[error("response is missing aggregate value '{key}'")]
    MissingAggregate { key: String },
}

/// Errors raised while narrowing an untyped result to a requested shape
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CastError {
    /// The materialized shape cannot satisfy the requested one
    #[error("cannot cast {actual} result to {expected}")]
    Shape {
        expected: String,
        actual: &'static str,
    },

    /// A document could not be decoded into the requested type
    #[error("cannot decode document into {expected}: {detail}")]
    Decode { expected: String, detail: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_materialize_display() {
        assert!(MaterializeError::EmptySequence
            .to_string()
            .contains("no matching"));
        let err = MaterializeError::MissingAggregate { key: "cost".into() };
        assert!(err.to_string().contains("cost"));
    }

    #[test]
    fn test_cast_display() {
        let err = CastError::Shape {
            expected: "u64".into(),
            actual: "documents",
        };
        assert!(err.to_string().contains("documents"));
        assert!(err.to_string().contains("u64"));
    }
}
