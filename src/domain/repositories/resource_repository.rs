//! Generic repository capability for the five standard resource operations.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::query::{EntitySchema, ListQuery};
use crate::error::AppError;

/// Capability interface every listable/CRUD-able entity implements.
///
/// The generic [`crate::application::services::ResourceService`] is
/// parameterized by this trait, so the list/get/create/update/delete
/// semantics are written once and resolved per entity at compile time.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgTourRepository`]
/// - [`crate::infrastructure::persistence::PgUserRepository`]
/// - [`crate::infrastructure::persistence::PgReviewRepository`]
#[async_trait]
pub trait ResourceRepository: Send + Sync {
    type Entity: Send + Sync + 'static;
    type Create: Send + 'static;
    type Patch: Send + 'static;

    /// Column schema used to validate and compose list queries.
    fn schema(&self) -> &'static EntitySchema;

    /// Runs a refined list query, materializing an ordered page of entities.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn list(&self, query: &ListQuery) -> Result<Vec<Self::Entity>, AppError>;

    /// Fetches one entity by id.
    async fn find_by_id(&self, id: i64) -> Result<Option<Self::Entity>, AppError>;

    /// Persists a new entity and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Duplicate`] on unique-constraint violations and
    /// [`AppError::Validation`] on check-constraint violations.
    async fn create(&self, input: Self::Create) -> Result<Self::Entity, AppError>;

    /// Partially updates an entity. Returns `None` when the id does not
    /// exist.
    async fn update(&self, id: i64, patch: Self::Patch) -> Result<Option<Self::Entity>, AppError>;

    /// Deletes an entity. Returns `false` when the id does not exist.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}

/// Shared, dynamically dispatched resource repository handle.
pub type DynResourceRepository<E, C, P> =
    Arc<dyn ResourceRepository<Entity = E, Create = C, Patch = P>>;
