//! Search execution
//!
//! [`SearchTransport`] is the single-round-trip seam; the orchestrator
//! depends only on [`SearchExecutor`]. The shipped [`RetryingExecutor`]
//! wraps a transport with the configured retry policy, a per-attempt
//! timeout, structured attempt logging, and cancellation observation.
//! The network wait is the only suspension point of an execution.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use futures_util::future::BoxFuture;
use serde_json::Value;

use crate::cancel::CancellationToken;
use crate::observability::LogSink;
use crate::request::{AggregateSpec, SearchRequest};
use crate::response::{Hit, SearchResponse};

use super::errors::{SearchError, SearchResult};
use super::retry::RetryPolicy;

/// Future type of one search outcome
///
/// `Ok(None)` signals "no response received" and is rejected by the
/// orchestrator; it is never a valid empty result.
pub type SearchFuture<'a> = BoxFuture<'a, SearchResult<Option<SearchResponse>>>;

/// One network round-trip against the remote service
pub trait SearchTransport: Send + Sync {
    /// Sends the request and decodes the raw response
    fn send<'a>(&'a self, request: &'a SearchRequest) -> SearchFuture<'a>;
}

/// Executes a search request to completion
///
/// Implementations may retry internally; the orchestrator observes only
/// the final success or final failure, and the supplied token must be
/// honored while I/O is outstanding.
pub trait SearchExecutor: Send + Sync {
    /// Runs the request, observing the token during network waits
    fn search<'a>(
        &'a self,
        request: &'a SearchRequest,
        token: &'a CancellationToken,
    ) -> SearchFuture<'a>;
}

/// The shipped executor: transport + retry policy + timeout + logging
pub struct RetryingExecutor {
    transport: Arc<dyn SearchTransport>,
    retry: Arc<dyn RetryPolicy>,
    log: Arc<dyn LogSink>,
    timeout: Duration,
}

impl RetryingExecutor {
    /// Creates an executor over the given transport
    pub fn new(
        transport: Arc<dyn SearchTransport>,
        retry: Arc<dyn RetryPolicy>,
        log: Arc<dyn LogSink>,
        timeout: Duration,
    ) -> Self {
        Self {
            transport,
            retry,
            log,
            timeout,
        }
    }

    async fn attempt(&self, request: &SearchRequest) -> SearchResult<Option<SearchResponse>> {
        match tokio::time::timeout(self.timeout, self.transport.send(request)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(SearchError::Timeout(self.timeout.as_millis() as u64)),
        }
    }
}

impl SearchExecutor for RetryingExecutor {
    fn search<'a>(
        &'a self,
        request: &'a SearchRequest,
        token: &'a CancellationToken,
    ) -> SearchFuture<'a> {
        Box::pin(async move {
            let started = Instant::now();
            let mut attempt: u32 = 0;
            loop {
                attempt += 1;
                let attempt_field = attempt.to_string();
                self.log.trace(
                    "search_attempt",
                    &[
                        ("attempt", attempt_field.as_str()),
                        ("collection", request.collection.as_str()),
                    ],
                );

                let outcome = tokio::select! {
                    biased;
                    _ = token.cancelled() => return Err(SearchError::Cancelled),
                    outcome = self.attempt(request) => outcome,
                };

                match outcome {
                    Ok(response) => {
                        let elapsed = started.elapsed().as_millis().to_string();
                        self.log.info(
                            "search_complete",
                            &[
                                ("attempt", attempt_field.as_str()),
                                ("collection", request.collection.as_str()),
                                ("elapsed_ms", elapsed.as_str()),
                            ],
                        );
                        return Ok(response);
                    }
                    Err(error) => match self.retry.backoff(attempt, &error) {
                        Some(delay) => {
                            let delay_field = delay.as_millis().to_string();
                            let error_field = error.to_string();
                            self.log.warn(
                                "search_retry",
                                &[
                                    ("attempt", attempt_field.as_str()),
                                    ("delay_ms", delay_field.as_str()),
                                    ("error", error_field.as_str()),
                                ],
                            );
                            tokio::select! {
                                biased;
                                _ = token.cancelled() => return Err(SearchError::Cancelled),
                                _ = tokio::time::sleep(delay) => {}
                            }
                        }
                        None => {
                            let error_field = error.to_string();
                            self.log.error(
                                "search_failed",
                                &[
                                    ("attempt", attempt_field.as_str()),
                                    ("collection", request.collection.as_str()),
                                    ("error", error_field.as_str()),
                                ],
                            );
                            return Err(error);
                        }
                    },
                }
            }
        })
    }
}

/// In-memory transport evaluating requests against local collections
///
/// Serves tests and demos; applies criteria, ordering, paging,
/// projection and aggregates the way a remote service would.
pub struct InMemoryTransport {
    collections: RwLock<HashMap<String, Vec<(String, Value)>>>,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
        }
    }

    /// Adds a document to a collection
    pub fn insert(&self, collection: &str, id: &str, document: Value) {
        let mut collections = self
            .collections
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        collections
            .entry(collection.to_string())
            .or_default()
            .push((id.to_string(), document));
    }

    fn evaluate(&self, request: &SearchRequest) -> SearchResponse {
        let collections = self
            .collections
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let documents: Vec<(String, Value)> = collections
            .get(&request.collection)
            .cloned()
            .unwrap_or_default();
        drop(collections);

        let mut matched: Vec<(String, Value)> = documents
            .into_iter()
            .filter(|(_, doc)| request.criteria.matches(doc))
            .collect();

        let total = matched.len() as u64;

        let mut response = SearchResponse::empty();

        if let Some(aggregate) = &request.aggregate {
            match aggregate {
                AggregateSpec::Count => {
                    response
                        .aggregates
                        .insert("count".to_string(), Value::from(total));
                }
                AggregateSpec::Min { field } => {
                    if let Some(value) = Self::fold_field(&matched, field, true) {
                        response.aggregates.insert(field.clone(), value);
                    }
                }
                AggregateSpec::Max { field } => {
                    if let Some(value) = Self::fold_field(&matched, field, false) {
                        response.aggregates.insert(field.clone(), value);
                    }
                }
            }
        }

        Self::sort_documents(&mut matched, request);

        let paged = matched
            .into_iter()
            .skip(request.skip)
            .take(request.take.unwrap_or(usize::MAX));

        response.hits.total = total;
        response.hits.hits = paged
            .map(|(id, doc)| Hit::new(id, Self::project(doc, request.fields.as_ref())))
            .collect();
        response
    }

    fn sort_documents(documents: &mut [(String, Value)], request: &SearchRequest) {
        if request.sort.is_empty() {
            return;
        }
        documents.sort_by(|(_, a), (_, b)| {
            for key in &request.sort {
                let ordering = match (a.get(&key.field), b.get(&key.field)) {
                    (Some(Value::Number(av)), Some(Value::Number(bv))) => {
                        let af = av.as_f64().unwrap_or(0.0);
                        let bf = bv.as_f64().unwrap_or(0.0);
                        af.partial_cmp(&bf).unwrap_or(std::cmp::Ordering::Equal)
                    }
                    (Some(Value::String(av)), Some(Value::String(bv))) => av.cmp(bv),
                    _ => std::cmp::Ordering::Equal,
                };
                let ordering = if key.descending {
                    ordering.reverse()
                } else {
                    ordering
                };
                if ordering != std::cmp::Ordering::Equal {
                    return ordering;
                }
            }
            std::cmp::Ordering::Equal
        });
    }

    fn project(mut document: Value, fields: Option<&Vec<String>>) -> Value {
        let Some(fields) = fields else {
            return document;
        };
        if let Some(object) = document.as_object_mut() {
            let keys: Vec<String> = object.keys().cloned().collect();
            for key in keys {
                if !fields.contains(&key) {
                    object.remove(&key);
                }
            }
        }
        document
    }

    /// Minimum or maximum of a numeric/string field across documents
    fn fold_field(documents: &[(String, Value)], field: &str, min: bool) -> Option<Value> {
        let mut best: Option<Value> = None;
        for (_, doc) in documents {
            let Some(candidate) = doc.get(field) else {
                continue;
            };
            if candidate.is_null() {
                continue;
            }
            best = match best {
                None => Some(candidate.clone()),
                Some(current) => {
                    let keep_candidate = match (&current, candidate) {
                        (Value::Number(a), Value::Number(b)) => {
                            let af = a.as_f64().unwrap_or(0.0);
                            let bf = b.as_f64().unwrap_or(0.0);
                            if min {
                                bf < af
                            } else {
                                bf > af
                            }
                        }
                        (Value::String(a), Value::String(b)) => {
                            if min {
                                b < a
                            } else {
                                b > a
                            }
                        }
                        _ => false,
                    };
                    if keep_candidate {
                        Some(candidate.clone())
                    } else {
                        Some(current)
                    }
                }
            };
        }
        best
    }
}

impl Default for InMemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchTransport for InMemoryTransport {
    fn send<'a>(&'a self, request: &'a SearchRequest) -> SearchFuture<'a> {
        let response = self.evaluate(request);
        Box::pin(async move { Ok(Some(response)) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::retry::{ExponentialBackoff, NoRetry};
    use crate::observability::NullLog;
    use crate::query::Criteria;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn request(collection: &str, criteria: Criteria) -> SearchRequest {
        SearchRequest {
            collection: collection.to_string(),
            criteria,
            fields: None,
            sort: Vec::new(),
            skip: 0,
            take: None,
            aggregate: None,
        }
    }

    fn seeded_transport() -> InMemoryTransport {
        let transport = InMemoryTransport::new();
        transport.insert("robot", "r1", json!({"name": "rover", "zone": 1, "cost": 10}));
        transport.insert("robot", "r2", json!({"name": "dalek", "zone": 3, "cost": 30}));
        transport.insert("robot", "r3", json!({"name": "robby", "zone": 3, "cost": 20}));
        transport
    }

    #[tokio::test]
    async fn test_in_memory_filters_and_totals() {
        let transport = seeded_transport();
        let request = request("robot", Criteria::term("zone", json!(3)));

        let response = transport.send(&request).await.unwrap().unwrap();
        assert_eq!(response.hits.total, 2);
        assert_eq!(response.hits.hits.len(), 2);
    }

    #[tokio::test]
    async fn test_in_memory_sort_and_paging() {
        let transport = seeded_transport();
        let mut request = request("robot", Criteria::Always);
        request.sort = vec![crate::request::SortField {
            field: "cost".into(),
            descending: true,
        }];
        request.skip = 1;
        request.take = Some(1);

        let response = transport.send(&request).await.unwrap().unwrap();
        assert_eq!(response.hits.total, 3);
        assert_eq!(response.hits.hits.len(), 1);
        assert_eq!(response.hits.hits[0].source["cost"], 20);
    }

    #[tokio::test]
    async fn test_in_memory_projection() {
        let transport = seeded_transport();
        let mut request = request("robot", Criteria::term("name", json!("rover")));
        request.fields = Some(vec!["name".into()]);

        let response = transport.send(&request).await.unwrap().unwrap();
        let source = &response.hits.hits[0].source;
        assert_eq!(source["name"], "rover");
        assert!(source.get("zone").is_none());
    }

    #[tokio::test]
    async fn test_in_memory_min_max_aggregates() {
        let transport = seeded_transport();

        let mut min_request = request("robot", Criteria::Always);
        min_request.take = Some(0);
        min_request.aggregate = Some(AggregateSpec::Min {
            field: "cost".into(),
        });
        let response = transport.send(&min_request).await.unwrap().unwrap();
        assert_eq!(response.aggregates["cost"], json!(10));

        let mut max_request = request("robot", Criteria::Always);
        max_request.take = Some(0);
        max_request.aggregate = Some(AggregateSpec::Max {
            field: "cost".into(),
        });
        let response = transport.send(&max_request).await.unwrap().unwrap();
        assert_eq!(response.aggregates["cost"], json!(30));
    }

    #[tokio::test]
    async fn test_in_memory_unknown_collection_is_empty() {
        let transport = InMemoryTransport::new();
        let response = transport
            .send(&request("ghost", Criteria::Always))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(response.hits.total, 0);
    }

    /// Transport failing a fixed number of times before succeeding
    struct FlakyTransport {
        failures: AtomicUsize,
    }

    impl SearchTransport for FlakyTransport {
        fn send<'a>(&'a self, _request: &'a SearchRequest) -> SearchFuture<'a> {
            Box::pin(async move {
                if self.failures.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                    if n > 0 {
                        Some(n - 1)
                    } else {
                        None
                    }
                }).is_ok()
                {
                    Err(SearchError::Transport("connection reset".into()))
                } else {
                    Ok(Some(SearchResponse::empty()))
                }
            })
        }
    }

    #[tokio::test]
    async fn test_retrying_executor_recovers_from_transient_failures() {
        let executor = RetryingExecutor::new(
            Arc::new(FlakyTransport {
                failures: AtomicUsize::new(2),
            }),
            Arc::new(ExponentialBackoff {
                max_attempts: 5,
                base_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(2),
            }),
            Arc::new(NullLog),
            Duration::from_secs(1),
        );

        let token = CancellationToken::none();
        let outcome = executor
            .search(&request("robot", Criteria::Always), &token)
            .await;
        assert!(outcome.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_retrying_executor_gives_up_after_budget() {
        let executor = RetryingExecutor::new(
            Arc::new(FlakyTransport {
                failures: AtomicUsize::new(10),
            }),
            Arc::new(ExponentialBackoff {
                max_attempts: 2,
                base_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(2),
            }),
            Arc::new(NullLog),
            Duration::from_secs(1),
        );

        let token = CancellationToken::none();
        let outcome = executor
            .search(&request("robot", Criteria::Always), &token)
            .await;
        assert_eq!(
            outcome.unwrap_err(),
            SearchError::Transport("connection reset".into())
        );
    }

    /// Transport that never completes
    struct HangingTransport;

    impl SearchTransport for HangingTransport {
        fn send<'a>(&'a self, _request: &'a SearchRequest) -> SearchFuture<'a> {
            Box::pin(std::future::pending())
        }
    }

    #[tokio::test]
    async fn test_cancellation_during_pending_request() {
        let executor = RetryingExecutor::new(
            Arc::new(HangingTransport),
            Arc::new(NoRetry),
            Arc::new(NullLog),
            Duration::from_secs(60),
        );

        let token = CancellationToken::new();
        let cancel = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            cancel.cancel();
        });

        let request = request("robot", Criteria::Always);
        let outcome = tokio::time::timeout(
            Duration::from_secs(2),
            executor.search(&request, &token),
        )
        .await
        .unwrap();
        assert_eq!(outcome.unwrap_err(), SearchError::Cancelled);
    }

    #[tokio::test]
    async fn test_timeout_classified_as_timeout_error() {
        let executor = RetryingExecutor::new(
            Arc::new(HangingTransport),
            Arc::new(NoRetry),
            Arc::new(NullLog),
            Duration::from_millis(10),
        );

        let token = CancellationToken::none();
        let outcome = executor
            .search(&request("robot", Criteria::Always), &token)
            .await;
        assert_eq!(outcome.unwrap_err(), SearchError::Timeout(10));
    }
}
