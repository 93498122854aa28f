//! Result materialization
//!
//! A [`Materializer`] is bound at translation time to the shape of the
//! expected result and converts a raw [`SearchResponse`] into a
//! [`QueryValue`]. Materialization is pure given its input.
//!
//! [`FromQueryValue`] narrows the untyped value to the shape a typed
//! entry point requested; a failed narrowing surfaces as a cast error,
//! never as a silent coercion.

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::errors::{CastError, MaterializeError, MaterializeResult};
use super::model::SearchResponse;

/// Strategy converting a raw response into the expected result shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Materializer {
    /// All hits as a sequence of documents
    Documents,
    /// The first hit as a scalar document
    SingleDocument {
        /// Yield a null scalar instead of failing when nothing matched
        or_default: bool,
    },
    /// Total match count
    Count,
    /// A named aggregate value
    Aggregate { key: String },
}

impl Materializer {
    /// Converts a response into the bound result shape
    pub fn materialize(&self, response: &SearchResponse) -> MaterializeResult<QueryValue> {
        match self {
            Materializer::Documents => Ok(QueryValue::Documents(
                response
                    .hits
                    .hits
                    .iter()
                    .map(|hit| hit.source.clone())
                    .collect(),
            )),
            Materializer::SingleDocument { or_default } => {
                match response.hits.hits.first() {
                    Some(hit) => Ok(QueryValue::Scalar(hit.source.clone())),
                    None if *or_default => Ok(QueryValue::Scalar(Value::Null)),
                    None => Err(MaterializeError::EmptySequence),
                }
            }
            Materializer::Count => Ok(QueryValue::Count(response.hits.total)),
            Materializer::Aggregate { key } => match response.aggregates.get(key) {
                Some(value) => Ok(QueryValue::Scalar(value.clone())),
                None => Err(MaterializeError::MissingAggregate { key: key.clone() }),
            },
        }
    }
}

/// Untyped result of a query execution
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    /// Zero or more documents
    Documents(Vec<Value>),
    /// A single value
    Scalar(Value),
    /// A non-negative count
    Count(u64),
}

impl QueryValue {
    /// Shape name for diagnostics
    pub fn shape_name(&self) -> &'static str {
        match self {
            QueryValue::Documents(_) => "documents",
            QueryValue::Scalar(_) => "scalar",
            QueryValue::Count(_) => "count",
        }
    }

    /// Decodes a scalar result into a concrete type
    pub fn decode_scalar<T: DeserializeOwned>(self) -> Result<T, CastError> {
        match self {
            QueryValue::Scalar(value) => {
                serde_json::from_value(value).map_err(|e| CastError::Decode {
                    expected: std::any::type_name::<T>().to_string(),
                    detail: e.to_string(),
                })
            }
            other => Err(CastError::Shape {
                expected: std::any::type_name::<T>().to_string(),
                actual: other.shape_name(),
            }),
        }
    }
}

/// Narrows an untyped result to a statically requested shape
pub trait FromQueryValue: Sized {
    /// Performs the narrowing
    fn from_query_value(value: QueryValue) -> Result<Self, CastError>;
}

impl FromQueryValue for QueryValue {
    fn from_query_value(value: QueryValue) -> Result<Self, CastError> {
        Ok(value)
    }
}

impl FromQueryValue for u64 {
    fn from_query_value(value: QueryValue) -> Result<Self, CastError> {
        match value {
            QueryValue::Count(count) => Ok(count),
            other => Err(CastError::Shape {
                expected: "u64".into(),
                actual: other.shape_name(),
            }),
        }
    }
}

impl FromQueryValue for i64 {
    fn from_query_value(value: QueryValue) -> Result<Self, CastError> {
        match value {
            QueryValue::Scalar(Value::Number(n)) => n.as_i64().ok_or(CastError::Shape {
                expected: "i64".into(),
                actual: "scalar",
            }),
            other => Err(CastError::Shape {
                expected: "i64".into(),
                actual: other.shape_name(),
            }),
        }
    }
}

impl FromQueryValue for f64 {
    fn from_query_value(value: QueryValue) -> Result<Self, CastError> {
        match value {
            QueryValue::Scalar(Value::Number(n)) => n.as_f64().ok_or(CastError::Shape {
                expected: "f64".into(),
                actual: "scalar",
            }),
            other => Err(CastError::Shape {
                expected: "f64".into(),
                actual: other.shape_name(),
            }),
        }
    }
}

impl FromQueryValue for Value {
    fn from_query_value(value: QueryValue) -> Result<Self, CastError> {
        match value {
            QueryValue::Scalar(value) => Ok(value),
            other => Err(CastError::Shape {
                expected: "value".into(),
                actual: other.shape_name(),
            }),
        }
    }
}

impl<T: DeserializeOwned> FromQueryValue for Vec<T> {
    fn from_query_value(value: QueryValue) -> Result<Self, CastError> {
        match value {
            QueryValue::Documents(documents) => documents
                .into_iter()
                .map(|doc| {
                    serde_json::from_value(doc).map_err(|e| CastError::Decode {
                        expected: std::any::type_name::<T>().to_string(),
                        detail: e.to_string(),
                    })
                })
                .collect(),
            other => Err(CastError::Shape {
                expected: std::any::type_name::<T>().to_string(),
                actual: other.shape_name(),
            }),
        }
    }
}
