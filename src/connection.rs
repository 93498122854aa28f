//! Connection configuration
//!
//! Describes how to reach the remote search service. Immutable for the
//! lifetime of the provider; validated fail-fast at provider
//! construction.

use std::time::Duration;

/// Default per-attempt network timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the remote search service connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Base endpoint of the search service
    pub endpoint: String,
    /// Optional prefix applied to every collection identifier
    pub collection_prefix: Option<String>,
    /// Per-attempt timeout for a single network round-trip
    pub timeout: Duration,
}

impl ConnectionConfig {
    /// Create a configuration for the given endpoint with defaults
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            collection_prefix: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets the collection prefix
    pub fn with_collection_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.collection_prefix = Some(prefix.into());
        self
    }

    /// Sets the per-attempt timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Applies the configured prefix to a collection identifier
    pub fn prefixed_collection(&self, collection: &str) -> String {
        match &self.collection_prefix {
            Some(prefix) => format!("{}{}", prefix, collection),
            None => collection.to_string(),
        }
    }
}
