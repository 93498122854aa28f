//! Response handling
//!
//! The raw payload model returned by the remote service, the
//! materializers that turn it into typed results, and the memory guard
//! that releases oversized hit buffers once materialization is done.

mod errors;
mod materialize;
mod memory;
mod model;

pub use errors::{CastError, MaterializeError, MaterializeResult};
pub use materialize::{FromQueryValue, Materializer, QueryValue};
pub use memory::{release_large_hit_buffer, LARGE_HIT_BUFFER};
pub use model::{Hit, HitCollection, SearchResponse};
