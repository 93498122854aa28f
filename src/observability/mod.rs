//! Observability for quarry
//!
//! Structured logging for query execution. A log sink is supplied to the
//! provider at construction and shared read-only by every execution:
//!
//! - `query_execute` / `query_short_circuit` from the provider
//! - `search_attempt` / `search_retry` / `search_complete` from the executor
//!
//! # Principles
//!
//! 1. Logging is read-only: no side effects on execution
//! 2. One log line = one event
//! 3. Deterministic field ordering

mod logger;

pub use logger::{JsonLogger, LogSink, NullLog, Severity};
