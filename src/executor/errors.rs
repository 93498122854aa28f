//! Search execution error types

use thiserror::Error;

/// Result type for one search execution
pub type SearchResult<T> = Result<T, SearchError>;

/// Errors raised while executing a search request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    /// The transport could not complete the round-trip
    #[error("transport failure: {0}")]
    Transport(String),

    /// A single attempt exceeded the configured timeout
    #[error("search timed out after {0} ms")]
    Timeout(u64),

    /// The service answered with a non-success status
    #[error("search service returned status {code}: {message}")]
    Status { code: u16, message: String },

    /// The response payload could not be decoded
    #[error("failed to decode search response: {0}")]
    Decode(String),

    /// The caller's cancellation token fired while I/O was outstanding
    #[error("search was cancelled")]
    Cancelled,
}

impl SearchError {
    /// Returns true if a retry policy may reschedule this failure
    ///
    /// Transport faults, timeouts and 5xx statuses are transient;
    /// decode failures, 4xx statuses and cancellation are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            SearchError::Transport(_) | SearchError::Timeout(_) => true,
            SearchError::Status { code, .. } => *code >= 500,
            SearchError::Decode(_) | SearchError::Cancelled => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_failures_are_retryable() {
        assert!(SearchError::Transport("connection reset".into()).is_retryable());
        assert!(SearchError::Timeout(1000).is_retryable());
        assert!(SearchError::Status {
            code: 503,
            message: "unavailable".into()
        }
        .is_retryable());
    }

    #[test]
    fn test_permanent_failures_are_not_retryable() {
        assert!(!SearchError::Status {
            code: 400,
            message: "bad request".into()
        }
        .is_retryable());
        assert!(!SearchError::Decode("truncated".into()).is_retryable());
        assert!(!SearchError::Cancelled.is_retryable());
    }
}
