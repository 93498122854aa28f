//! Query descriptions for quarry
//!
//! A query description is an immutable, composable statement of what to
//! fetch: a filter criteria tree, a projection, ordering, paging, and a
//! terminal operation (fetch, first, count, min, max). Descriptions are
//! owned by the caller, consumed read-only by translation, and never
//! shared across executions.

mod ast;
mod criteria;
mod typed;

pub use ast::{QueryDescription, QueryOperation, ResultShape, SortDirection, SortKey};
pub use criteria::{Criteria, RangeOp};
pub use typed::{element_of, DynQuery, ElementType, TypedQuery};
