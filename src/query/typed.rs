//! Typed and type-erased query objects
//!
//! A [`TypedQuery<T>`] binds a query description to a provider with a
//! statically known element type. [`DynQuery`] is its type-erased face,
//! used when the element type is only known at runtime; the
//! [`ElementType`] descriptor carries a constructor fn so the dynamic
//! factory can build the concrete `TypedQuery<T>` without reflection.

use std::any::TypeId;
use std::marker::PhantomData;

use futures_util::future::BoxFuture;
use serde::de::DeserializeOwned;

use crate::cancel::CancellationToken;
use crate::provider::{QueryError, QueryProvider};
use crate::response::QueryValue;

use super::ast::QueryDescription;

/// Runtime descriptor of a query's element type
///
/// Carries enough to identify the type and to construct the concrete
/// typed query object behind a narrow interface.
#[derive(Clone, Copy)]
pub struct ElementType {
    id: TypeId,
    name: &'static str,
    construct: fn(QueryProvider, QueryDescription) -> Result<Box<dyn DynQuery>, QueryError>,
}

impl ElementType {
    /// The element's TypeId
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Unqualified type name
    pub fn short_name(&self) -> &'static str {
        self.name.rsplit("::").next().unwrap_or(self.name)
    }

    /// Builds the concrete typed query for this element
    pub(crate) fn construct(
        &self,
        provider: QueryProvider,
        description: QueryDescription,
    ) -> Result<Box<dyn DynQuery>, QueryError> {
        (self.construct)(provider, description)
    }
}

impl PartialEq for ElementType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ElementType {}

impl std::fmt::Debug for ElementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementType").field("name", &self.name).finish()
    }
}

/// Descriptor for element type `T`
pub fn element_of<T>() -> ElementType
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    ElementType {
        id: TypeId::of::<T>(),
        name: std::any::type_name::<T>(),
        construct: |provider, description| {
            TypedQuery::<T>::from_parts(provider, description)
                .map(|query| Box::new(query) as Box<dyn DynQuery>)
        },
    }
}

/// Type-erased query object
///
/// Behaviorally equivalent to the `TypedQuery<T>` it erases: both run
/// the same description through the same provider.
pub trait DynQuery: Send + Sync {
    /// The description this query will execute
    fn description(&self) -> &QueryDescription;

    /// Fully qualified element type name
    fn element_name(&self) -> &'static str;

    /// Blocking execution to an untyped result
    fn execute(&self) -> Result<QueryValue, QueryError>;

    /// Async execution to an untyped result
    fn execute_async(
        &self,
        token: CancellationToken,
    ) -> BoxFuture<'_, Result<QueryValue, QueryError>>;
}

/// A query whose element type is statically `T`
pub struct TypedQuery<T> {
    provider: QueryProvider,
    description: QueryDescription,
    _element: PhantomData<fn() -> T>,
}

impl<T> std::fmt::Debug for TypedQuery<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedQuery")
            .field("element", &std::any::type_name::<T>())
            .field("description", &self.description)
            .finish()
    }
}

impl std::fmt::Debug for dyn DynQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynQuery")
            .field("element", &self.element_name())
            .field("description", self.description())
            .finish()
    }
}

impl<T> TypedQuery<T>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    /// Binds a description to a provider, checking element identity
    ///
    /// The description must carry an element descriptor for exactly `T`.
    pub(crate) fn from_parts(
        provider: QueryProvider,
        description: QueryDescription,
    ) -> Result<Self, QueryError> {
        match description.element_type() {
            Some(element) if element.id() == TypeId::of::<T>() => Ok(Self {
                provider,
                description,
                _element: PhantomData,
            }),
            Some(element) => Err(QueryError::IncompatibleShape {
                expected: std::any::type_name::<T>(),
                actual: element.name(),
            }),
            None => Err(QueryError::IncompatibleShape {
                expected: std::any::type_name::<T>(),
                actual: "untyped description",
            }),
        }
    }

    /// The description this query will execute
    pub fn description(&self) -> &QueryDescription {
        &self.description
    }

    /// Fetches all matching documents, blocking
    pub fn fetch(&self) -> Result<Vec<T>, QueryError> {
        self.provider.execute_as(&self.description)
    }

    /// Fetches all matching documents
    pub async fn fetch_async(&self, token: CancellationToken) -> Result<Vec<T>, QueryError> {
        self.provider
            .execute_async_as(&self.description, token)
            .await
    }

    /// Counts matching documents, blocking
    pub fn count(&self) -> Result<u64, QueryError> {
        self.provider.execute_as(&self.description.clone().count())
    }

    /// Counts matching documents
    pub async fn count_async(&self, token: CancellationToken) -> Result<u64, QueryError> {
        self.provider
            .execute_async_as(&self.description.clone().count(), token)
            .await
    }
}

impl<T> DynQuery for TypedQuery<T>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    fn description(&self) -> &QueryDescription {
        &self.description
    }

    fn element_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn execute(&self) -> Result<QueryValue, QueryError> {
        self.provider.execute(&self.description)
    }

    fn execute_async(
        &self,
        token: CancellationToken,
    ) -> BoxFuture<'_, Result<QueryValue, QueryError>> {
        Box::pin(async move { self.provider.execute_async(&self.description, token).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(serde::Deserialize)]
    struct Robot {
        #[allow(dead_code)]
        name: String,
    }

    #[derive(serde::Deserialize)]
    struct Drone {}

    #[test]
    fn test_element_identity() {
        let robot = element_of::<Robot>();
        let drone = element_of::<Drone>();

        assert_eq!(robot, element_of::<Robot>());
        assert_ne!(robot, drone);
        assert_eq!(robot.short_name(), "Robot");
        assert!(robot.name().contains("Robot"));
    }

    #[test]
    fn test_element_debug_uses_name() {
        let debug = format!("{:?}", element_of::<Robot>());
        assert!(debug.contains("Robot"));
    }
}
