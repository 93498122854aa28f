//! Transport-level search request
//!
//! A [`SearchRequest`] is a value fully determined by the query
//! description and the field mapping: the target collection, the
//! simplified filter criteria, projection, ordering, paging, and an
//! optional aggregate directive. Transports decide its wire encoding.

use serde::Serialize;

use crate::query::Criteria;

/// One ordering key with mapped field name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortField {
    /// Mapped document field
    pub field: String,
    /// Descending order when true
    pub descending: bool,
}

/// Aggregate directive carried by a request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum AggregateSpec {
    /// Count matching documents
    Count,
    /// Minimum value of a field
    Min { field: String },
    /// Maximum value of a field
    Max { field: String },
}

impl AggregateSpec {
    /// The response aggregate key this directive populates
    pub fn key(&self) -> &str {
        match self {
            AggregateSpec::Count => "count",
            AggregateSpec::Min { field } | AggregateSpec::Max { field } => field,
        }
    }
}

/// Structured description of one remote search operation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    /// Target document collection identifier
    pub collection: String,
    /// Simplified filter criteria with mapped field names
    pub criteria: Criteria,
    /// Optional projection (mapped field names)
    pub fields: Option<Vec<String>>,
    /// Ordering keys
    pub sort: Vec<SortField>,
    /// Documents to skip
    pub skip: usize,
    /// Maximum hits to return; `Some(0)` for aggregate-only requests
    pub take: Option<usize>,
    /// Optional aggregate directive
    pub aggregate: Option<AggregateSpec>,
}

impl SearchRequest {
    /// Returns true if the request's filter is the always-false sentinel
    ///
    /// Such a request has a known-empty result set and must never be
    /// sent over the network.
    pub fn is_never(&self) -> bool {
        self.criteria.is_never()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_never() {
        let request = SearchRequest {
            collection: "robot".into(),
            criteria: Criteria::Never,
            fields: None,
            sort: Vec::new(),
            skip: 0,
            take: None,
            aggregate: None,
        };
        assert!(request.is_never());
    }

    #[test]
    fn test_aggregate_keys() {
        assert_eq!(AggregateSpec::Count.key(), "count");
        assert_eq!(AggregateSpec::Min { field: "cost".into() }.key(), "cost");
        assert_eq!(AggregateSpec::Max { field: "cost".into() }.key(), "cost");
    }

    #[test]
    fn test_request_serializes() {
        let request = SearchRequest {
            collection: "robot".into(),
            criteria: Criteria::term("zone", serde_json::json!(3)),
            fields: Some(vec!["name".into()]),
            sort: vec![SortField {
                field: "name".into(),
                descending: false,
            }],
            skip: 0,
            take: Some(10),
            aggregate: None,
        };

        let encoded = serde_json::to_value(&request).unwrap();
        assert_eq!(encoded["collection"], "robot");
        assert_eq!(encoded["criteria"]["kind"], "term");
        assert_eq!(encoded["take"], 10);
    }
}
