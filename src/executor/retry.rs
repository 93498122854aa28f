//! Retry policy
//!
//! The policy object is supplied at provider construction and consulted
//! by the executor after each failed attempt. Its internal algorithm is
//! opaque to the orchestrator, which only observes the final success or
//! failure of the executor call.

use std::time::Duration;

use super::errors::SearchError;

/// Decides whether and when a failed attempt is retried
pub trait RetryPolicy: Send + Sync {
    /// Delay before the next attempt, or None to give up
    ///
    /// `attempt` is the number of attempts already made (1 after the
    /// first failure).
    fn backoff(&self, attempt: u32, error: &SearchError) -> Option<Duration>;
}

/// Deterministic exponential backoff with a cap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExponentialBackoff {
    /// Maximum total attempts
    pub max_attempts: u32,
    /// Delay after the first failure
    pub base_delay: Duration,
    /// Upper bound on any single delay
    pub max_delay: Duration,
}

impl ExponentialBackoff {
    /// Policy with the given attempt budget and default delays
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Self::default()
        }
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy for ExponentialBackoff {
    fn backoff(&self, attempt: u32, error: &SearchError) -> Option<Duration> {
        if !error.is_retryable() || attempt >= self.max_attempts {
            return None;
        }
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        Some(self.base_delay.saturating_mul(factor).min(self.max_delay))
    }
}

/// Policy that never retries
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRetry;

impl RetryPolicy for NoRetry {
    fn backoff(&self, _attempt: u32, _error: &SearchError) -> Option<Duration> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transient() -> SearchError {
        SearchError::Transport("connection reset".into())
    }

    #[test]
    fn test_backoff_doubles_until_cap() {
        let policy = ExponentialBackoff {
            max_attempts: 10,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(350),
        };

        assert_eq!(
            policy.backoff(1, &transient()),
            Some(Duration::from_millis(100))
        );
        assert_eq!(
            policy.backoff(2, &transient()),
            Some(Duration::from_millis(200))
        );
        // Capped at max_delay from the third failure on
        assert_eq!(
            policy.backoff(3, &transient()),
            Some(Duration::from_millis(350))
        );
        assert_eq!(
            policy.backoff(4, &transient()),
            Some(Duration::from_millis(350))
        );
    }

    #[test]
    fn test_attempt_budget_exhausts() {
        let policy = ExponentialBackoff::with_max_attempts(2);
        assert!(policy.backoff(1, &transient()).is_some());
        assert_eq!(policy.backoff(2, &transient()), None);
    }

    #[test]
    fn test_permanent_failure_never_retried() {
        let policy = ExponentialBackoff::default();
        let error = SearchError::Status {
            code: 400,
            message: "bad request".into(),
        };
        assert_eq!(policy.backoff(1, &error), None);
    }

    #[test]
    fn test_no_retry() {
        assert_eq!(NoRetry.backoff(1, &transient()), None);
    }
}
