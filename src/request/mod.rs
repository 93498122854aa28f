//! Search request construction
//!
//! Translation turns a query description into a transport-level
//! [`SearchRequest`] and the matching [`crate::response::Materializer`].
//! Translation is pure and deterministic: the request is fully
//! determined by the description and the field mapping.

mod errors;
mod model;
mod translator;

pub use errors::{TranslateError, TranslateResult};
pub use model::{AggregateSpec, SearchRequest, SortField};
pub use translator::{translate, Translation};
