//! Query execution orchestration
//!
//! [`QueryProvider`] is the single entry point: it translates a query
//! description, decides short-circuit versus network execution, drives
//! the async path with cancellation, materializes the response, and
//! releases oversized hit buffers, under both a blocking and an async
//! calling convention with identical failure types.
//!
//! # Per-execution state machine
//!
//! Start → Translating → {ShortCircuit | Executing} → Materializing →
//! MemoryCleanup → Done, with Failed absorbing from every step.

mod bridge;
mod errors;
mod factory;
mod provider;

pub use bridge::run_sync;
pub use errors::{ProviderResult, QueryError};
pub use provider::QueryProvider;
