//! Dynamic query factory
//!
//! Builds correctly-typed query objects when the element type is only
//! known at runtime. The description's element descriptor carries a
//! constructor fn, so construction happens behind a narrow interface;
//! a construction-time failure propagates as its original cause, never
//! as a generic activation failure.

use serde::de::DeserializeOwned;

use crate::query::{DynQuery, QueryDescription, ResultShape, TypedQuery};

use super::errors::{ProviderResult, QueryError};
use super::provider::QueryProvider;

fn shape_label(shape: ResultShape) -> &'static str {
    match shape {
        ResultShape::Sequence => "a sequence result",
        ResultShape::Scalar => "a scalar result",
        ResultShape::Count => "a count result",
    }
}

impl QueryProvider {
    /// Builds a type-erased query for a runtime-typed description
    ///
    /// The description's declared result type must be a sequence with a
    /// known element; anything else cannot construct a query object.
    pub fn create_query(
        &self,
        description: &QueryDescription,
    ) -> ProviderResult<Box<dyn DynQuery>> {
        let shape = description.shape();
        if shape != ResultShape::Sequence {
            return Err(QueryError::IncompatibleShape {
                expected: "a sequence of documents",
                actual: shape_label(shape),
            });
        }
        let Some(element) = description.element_type() else {
            return Err(QueryError::IncompatibleShape {
                expected: "a sequence of documents",
                actual: "an untyped description",
            });
        };
        element.construct(self.clone(), description.clone())
    }

    /// Builds a statically-typed query for a description of `T`
    pub fn create_typed_query<T>(
        &self,
        description: &QueryDescription,
    ) -> ProviderResult<TypedQuery<T>>
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        let shape = description.shape();
        if shape != ResultShape::Sequence {
            return Err(QueryError::IncompatibleShape {
                expected: std::any::type_name::<T>(),
                actual: shape_label(shape),
            });
        }
        TypedQuery::from_parts(self.clone(), description.clone())
    }
}
