//! Query description
//!
//! The caller-built, immutable description of what to fetch: filter
//! criteria, projection, ordering, paging, and the operation (fetch,
//! first, count, min, max). Consumed read-only by translation; created
//! per query and discarded after execution.

use super::criteria::Criteria;
use super::typed::{element_of, ElementType};

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// One ordering key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    /// Field to sort by
    pub field: String,
    /// Sort direction
    pub direction: SortDirection,
}

impl SortKey {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// The terminal operation of a query
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOperation {
    /// Fetch the matching documents
    Fetch,
    /// Fetch only the first matching document
    First {
        /// Yield a null scalar instead of failing when nothing matches
        or_default: bool,
    },
    /// Count the matching documents
    Count,
    /// Minimum value of a field across matches
    Min { field: String },
    /// Maximum value of a field across matches
    Max { field: String },
}

/// Statically knowable shape of a query result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultShape {
    /// Zero or more documents
    Sequence,
    /// A single value
    Scalar,
    /// A non-negative count
    Count,
}

/// Immutable, composable description of what to fetch
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDescription {
    /// Logical document type name (mapped to a collection at translation)
    pub target: String,
    /// Filter criteria tree
    pub criteria: Criteria,
    /// Optional field projection
    pub projection: Option<Vec<String>>,
    /// Ordering keys, applied in sequence
    pub sort: Vec<SortKey>,
    /// Documents to skip
    pub skip: usize,
    /// Maximum documents to return
    pub take: Option<usize>,
    /// Terminal operation
    pub operation: QueryOperation,
    /// Runtime element descriptor for typed descriptions
    pub(crate) element: Option<ElementType>,
}

impl QueryDescription {
    /// Creates an untyped description for the given target type name
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            criteria: Criteria::Always,
            projection: None,
            sort: Vec::new(),
            skip: 0,
            take: None,
            operation: QueryOperation::Fetch,
            element: None,
        }
    }

    /// Creates a typed description whose element type is `T`
    ///
    /// The target name is the unqualified type name of `T`; the mapping
    /// decides the collection it lives in.
    pub fn for_type<T>() -> Self
    where
        T: serde::de::DeserializeOwned + Send + Sync + 'static,
    {
        let element = element_of::<T>();
        Self {
            element: Some(element),
            ..Self::new(element.short_name())
        }
    }

    /// Conjoins a criterion onto the current filter
    pub fn filter(mut self, criteria: Criteria) -> Self {
        self.criteria = match self.criteria {
            Criteria::Always => criteria,
            existing => existing.and(criteria),
        };
        self
    }

    /// Sets the field projection
    pub fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projection = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Appends an ascending ordering key
    pub fn order_by(mut self, field: impl Into<String>) -> Self {
        self.sort.push(SortKey::asc(field));
        self
    }

    /// Appends a descending ordering key
    pub fn order_by_desc(mut self, field: impl Into<String>) -> Self {
        self.sort.push(SortKey::desc(field));
        self
    }

    /// Skips the first `n` matching documents
    pub fn skip(mut self, n: usize) -> Self {
        self.skip = n;
        self
    }

    /// Caps the number of returned documents
    pub fn take(mut self, n: usize) -> Self {
        self.take = Some(n);
        self
    }

    /// Terminal operation: count matches
    pub fn count(mut self) -> Self {
        self.operation = QueryOperation::Count;
        self
    }

    /// Terminal operation: first match
    pub fn first(mut self) -> Self {
        self.operation = QueryOperation::First { or_default: false };
        self
    }

    /// Terminal operation: first match, or a null scalar when empty
    pub fn first_or_default(mut self) -> Self {
        self.operation = QueryOperation::First { or_default: true };
        self
    }

    /// Terminal operation: minimum of `field` across matches
    pub fn min(mut self, field: impl Into<String>) -> Self {
        self.operation = QueryOperation::Min {
            field: field.into(),
        };
        self
    }

    /// Terminal operation: maximum of `field` across matches
    pub fn max(mut self, field: impl Into<String>) -> Self {
        self.operation = QueryOperation::Max {
            field: field.into(),
        };
        self
    }

    /// The statically knowable result shape of this description
    pub fn shape(&self) -> ResultShape {
        match self.operation {
            QueryOperation::Fetch => ResultShape::Sequence,
            QueryOperation::First { .. } => ResultShape::Scalar,
            QueryOperation::Count => ResultShape::Count,
            QueryOperation::Min { .. } | QueryOperation::Max { .. } => ResultShape::Scalar,
        }
    }

    /// Runtime element descriptor, present on typed descriptions
    pub fn element_type(&self) -> Option<ElementType> {
        self.element
    }
}
