//! Query execution orchestrator
//!
//! The single entry point turning a query description into a
//! materialized result, in blocking and async forms. One execution
//! moves strictly through translate → execute-or-shortcircuit →
//! materialize → memory cleanup; failure at any step absorbs the rest.
//! Retry never happens at this layer.

use std::sync::Arc;

use crate::cancel::CancellationToken;
use crate::connection::ConnectionConfig;
use crate::executor::{RetryingExecutor, RetryPolicy, SearchExecutor, SearchTransport};
use crate::mapping::FieldMapping;
use crate::observability::LogSink;
use crate::query::QueryDescription;
use crate::request::translate;
use crate::response::{release_large_hit_buffer, FromQueryValue, QueryValue, SearchResponse};

use super::errors::{ProviderResult, QueryError};

struct ProviderInner {
    connection: ConnectionConfig,
    mapping: Arc<dyn FieldMapping>,
    log: Arc<dyn LogSink>,
    retry: Arc<dyn RetryPolicy>,
    executor: Arc<dyn SearchExecutor>,
}

/// Query provider for a remote document-search service
///
/// Cheap to clone; clones share the connection, mapping, log, retry
/// policy and executor, all immutable after construction. Each
/// execution exclusively owns its description copy, translation and
/// response; concurrent executions never share mutable state.
#[derive(Clone)]
pub struct QueryProvider {
    inner: Arc<ProviderInner>,
}

impl std::fmt::Debug for QueryProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryProvider")
            .field("connection", &self.inner.connection)
            .finish_non_exhaustive()
    }
}

impl QueryProvider {
    /// Creates a provider over the given transport
    ///
    /// Construction is fail-fast: an unusable connection configuration
    /// is rejected here, never deferred to execution time.
    pub fn new(
        connection: ConnectionConfig,
        transport: Arc<dyn SearchTransport>,
        mapping: Arc<dyn FieldMapping>,
        log: Arc<dyn LogSink>,
        retry: Arc<dyn RetryPolicy>,
    ) -> ProviderResult<Self> {
        Self::validate(&connection)?;
        let executor = Arc::new(RetryingExecutor::new(
            transport,
            retry.clone(),
            log.clone(),
            connection.timeout,
        ));
        Ok(Self {
            inner: Arc::new(ProviderInner {
                connection,
                mapping,
                log,
                retry,
                executor,
            }),
        })
    }

    /// Creates a provider with a custom executor
    ///
    /// Substitutes the whole execution seam: retry, timeout and
    /// transport included.
    pub fn with_executor(
        connection: ConnectionConfig,
        executor: Arc<dyn SearchExecutor>,
        mapping: Arc<dyn FieldMapping>,
        log: Arc<dyn LogSink>,
        retry: Arc<dyn RetryPolicy>,
    ) -> ProviderResult<Self> {
        Self::validate(&connection)?;
        Ok(Self {
            inner: Arc::new(ProviderInner {
                connection,
                mapping,
                log,
                retry,
                executor,
            }),
        })
    }

    fn validate(connection: &ConnectionConfig) -> ProviderResult<()> {
        if connection.endpoint.is_empty() {
            return Err(QueryError::InvalidArgument(
                "connection endpoint must not be empty",
            ));
        }
        if connection.timeout.is_zero() {
            return Err(QueryError::InvalidArgument(
                "connection timeout must be non-zero",
            ));
        }
        Ok(())
    }

    /// The connection configuration
    pub fn connection(&self) -> &ConnectionConfig {
        &self.inner.connection
    }

    /// The field mapping
    pub fn mapping(&self) -> &dyn FieldMapping {
        self.inner.mapping.as_ref()
    }

    /// The log sink
    pub fn log(&self) -> &dyn LogSink {
        self.inner.log.as_ref()
    }

    /// The retry policy
    pub fn retry_policy(&self) -> &dyn RetryPolicy {
        self.inner.retry.as_ref()
    }

    /// Executes a description to an untyped result
    pub async fn execute_async(
        &self,
        description: &QueryDescription,
        token: CancellationToken,
    ) -> ProviderResult<QueryValue> {
        self.execute_core(description, token).await
    }

    /// Executes a description, narrowing to the requested shape
    pub async fn execute_async_as<R: FromQueryValue>(
        &self,
        description: &QueryDescription,
        token: CancellationToken,
    ) -> ProviderResult<R> {
        let value = self.execute_core(description, token).await?;
        Ok(R::from_query_value(value)?)
    }

    /// Blocking execution to an untyped result
    ///
    /// Bridges onto the async path without deadlocking, even when
    /// invoked from inside a runtime. Accepts no token: it runs to
    /// completion or fails, never observing external cancellation.
    pub fn execute(
        &self,
        description: &QueryDescription,
    ) -> ProviderResult<QueryValue> {
        let provider = self.clone();
        let description = description.clone();
        super::bridge::run_sync(async move {
            provider
                .execute_core(&description, CancellationToken::none())
                .await
        })
    }

    /// Blocking execution, narrowing to the requested shape
    pub fn execute_as<R: FromQueryValue>(
        &self,
        description: &QueryDescription,
    ) -> ProviderResult<R> {
        let value = self.execute(description)?;
        Ok(R::from_query_value(value)?)
    }

    async fn execute_core(
        &self,
        description: &QueryDescription,
        token: CancellationToken,
    ) -> ProviderResult<QueryValue> {
        if description.target.is_empty() {
            return Err(QueryError::InvalidArgument(
                "query target must not be empty",
            ));
        }

        let translation = translate(self.inner.mapping.as_ref(), description)?;
        let mut request = translation.request;
        request.collection = self.inner.connection.prefixed_collection(&request.collection);

        let execution_id = uuid::Uuid::new_v4().to_string();

        let mut response = if request.is_never() {
            // Known-empty result set: synthesize an empty response with
            // no network call and no suspension
            self.inner.log.trace(
                "query_short_circuit",
                &[
                    ("collection", request.collection.as_str()),
                    ("execution_id", execution_id.as_str()),
                ],
            );
            SearchResponse::empty()
        } else {
            self.inner.log.trace(
                "query_execute",
                &[
                    ("collection", request.collection.as_str()),
                    ("execution_id", execution_id.as_str()),
                ],
            );
            match self.inner.executor.search(&request, &token).await? {
                Some(response) => response,
                None => return Err(QueryError::NoResponse),
            }
        };

        let value = translation.materializer.materialize(&response)?;

        // The response is no longer read past this point; release an
        // oversized hit buffer now instead of at end of scope
        if release_large_hit_buffer(&mut response) {
            self.inner.log.trace(
                "hit_buffer_released",
                &[("execution_id", execution_id.as_str())],
            );
        }

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::InMemoryTransport;
    use crate::mapping::DefaultFieldMapping;
    use crate::observability::NullLog;
    use crate::query::{Criteria, QueryDescription};
    use crate::executor::ExponentialBackoff;
    use serde_json::json;

    fn provider_with(transport: Arc<InMemoryTransport>) -> QueryProvider {
        QueryProvider::new(
            ConnectionConfig::new("http://localhost:9200"),
            transport,
            Arc::new(DefaultFieldMapping::new()),
            Arc::new(NullLog),
            Arc::new(ExponentialBackoff::default()),
        )
        .unwrap()
    }

    #[test]
    fn test_construction_rejects_empty_endpoint() {
        let err = QueryProvider::new(
            ConnectionConfig::new(""),
            Arc::new(InMemoryTransport::new()),
            Arc::new(DefaultFieldMapping::new()),
            Arc::new(NullLog),
            Arc::new(ExponentialBackoff::default()),
        )
        .unwrap_err();
        assert!(matches!(err, QueryError::InvalidArgument(_)));
    }

    #[test]
    fn test_construction_rejects_zero_timeout() {
        let config = ConnectionConfig::new("http://x")
            .with_timeout(std::time::Duration::ZERO);
        let err = QueryProvider::new(
            config,
            Arc::new(InMemoryTransport::new()),
            Arc::new(DefaultFieldMapping::new()),
            Arc::new(NullLog),
            Arc::new(ExponentialBackoff::default()),
        )
        .unwrap_err();
        assert!(matches!(err, QueryError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_empty_target_rejected_at_boundary() {
        let provider = provider_with(Arc::new(InMemoryTransport::new()));
        let err = provider
            .execute_async(&QueryDescription::new(""), CancellationToken::none())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            QueryError::InvalidArgument("query target must not be empty")
        );
    }

    #[tokio::test]
    async fn test_fetch_documents() {
        let transport = Arc::new(InMemoryTransport::new());
        transport.insert("robot", "r1", json!({"name": "rover", "zone": 3}));
        transport.insert("robot", "r2", json!({"name": "dalek", "zone": 1}));

        let provider = provider_with(transport);
        let description =
            QueryDescription::new("Robot").filter(Criteria::term("zone", json!(3)));

        let value = provider
            .execute_async(&description, CancellationToken::none())
            .await
            .unwrap();
        assert_eq!(
            value,
            QueryValue::Documents(vec![json!({"name": "rover", "zone": 3})])
        );
    }

    #[tokio::test]
    async fn test_collection_prefix_applied() {
        let transport = Arc::new(InMemoryTransport::new());
        transport.insert("test_robot", "r1", json!({"name": "rover"}));

        let provider = QueryProvider::new(
            ConnectionConfig::new("http://x").with_collection_prefix("test_"),
            transport,
            Arc::new(DefaultFieldMapping::new()),
            Arc::new(NullLog),
            Arc::new(ExponentialBackoff::default()),
        )
        .unwrap();

        let value = provider
            .execute_async(&QueryDescription::new("Robot"), CancellationToken::none())
            .await
            .unwrap();
        assert_eq!(value, QueryValue::Documents(vec![json!({"name": "rover"})]));
    }

    #[tokio::test]
    async fn test_count_narrows_to_u64() {
        let transport = Arc::new(InMemoryTransport::new());
        transport.insert("robot", "r1", json!({"zone": 1}));
        transport.insert("robot", "r2", json!({"zone": 1}));

        let provider = provider_with(transport);
        let count: u64 = provider
            .execute_async_as(
                &QueryDescription::new("Robot").count(),
                CancellationToken::none(),
            )
            .await
            .unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_invalid_cast_surfaces() {
        let provider = provider_with(Arc::new(InMemoryTransport::new()));
        let err = provider
            .execute_async_as::<u64>(&QueryDescription::new("Robot"), CancellationToken::none())
            .await
            .unwrap_err();
        assert!(matches!(err, QueryError::InvalidCast(_)));
    }

    #[test]
    fn test_blocking_execute_outside_runtime() {
        let transport = Arc::new(InMemoryTransport::new());
        transport.insert("robot", "r1", json!({"name": "rover"}));

        let provider = provider_with(transport);
        let value = provider.execute(&QueryDescription::new("Robot")).unwrap();
        assert_eq!(value, QueryValue::Documents(vec![json!({"name": "rover"})]));
    }
}
