//! Raw response payload
//!
//! The wire-shaped result of one remote search execution: zero or more
//! hits plus optional aggregate values. Created fresh per execution by
//! the executor, owned exclusively by the orchestrator until handed to
//! the materializer, then eligible for release.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One matched document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    /// Document identifier
    #[serde(default)]
    pub id: String,
    /// Relevance score, when the service computes one
    #[serde(default)]
    pub score: Option<f64>,
    /// Document body
    #[serde(default)]
    pub source: Value,
}

impl Hit {
    /// Creates a hit with the given id and body
    pub fn new(id: impl Into<String>, source: Value) -> Self {
        Self {
            id: id.into(),
            score: None,
            source,
        }
    }
}

/// The matched-documents portion of a response
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HitCollection {
    /// Total matches across all pages, as reported by the service
    #[serde(default)]
    pub total: u64,
    /// Hits for the requested page
    #[serde(default)]
    pub hits: Vec<Hit>,
}

/// Raw result payload from the remote search service
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Service-reported execution time
    #[serde(default)]
    pub took_ms: u64,
    /// Matched documents
    #[serde(default)]
    pub hits: HitCollection,
    /// Aggregate values keyed by aggregate name
    #[serde(default)]
    pub aggregates: BTreeMap<String, Value>,
}

impl SearchResponse {
    /// An empty response: zero hits, zero total, no aggregates
    ///
    /// Synthesized by the orchestrator for short-circuited requests.
    pub fn empty() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_response() {
        let response = SearchResponse::empty();
        assert_eq!(response.hits.total, 0);
        assert!(response.hits.hits.is_empty());
        assert!(response.aggregates.is_empty());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let response: SearchResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(response, SearchResponse::empty());
    }

    #[test]
    fn test_roundtrip() {
        let mut response = SearchResponse::empty();
        response.hits.total = 2;
        response.hits.hits.push(Hit::new("a", json!({"zone": 1})));
        response.hits.hits.push(Hit::new("b", json!({"zone": 2})));
        response
            .aggregates
            .insert("cost".into(), json!(17));

        let encoded = serde_json::to_string(&response).unwrap();
        let decoded: SearchResponse = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, response);
    }
}
