//! Generic resource operations shared by every entity.

use serde_json::json;
use std::collections::HashMap;

use crate::domain::query::{EntitySchema, ListQuery};
use crate::domain::repositories::DynResourceRepository;
use crate::error::AppError;

/// The five standard operations (list, get, create, update, delete) written
/// once over the [`crate::domain::repositories::ResourceRepository`]
/// capability and instantiated per entity.
///
/// Entity-specific lifecycle side effects (slug derivation, password
/// hashing, rating aggregation) do not live here; the per-entity services
/// apply them explicitly around these calls.
pub struct ResourceService<E, C, P> {
    repository: DynResourceRepository<E, C, P>,
}

impl<E, C, P> ResourceService<E, C, P>
where
    E: Send + Sync + 'static,
    C: Send + 'static,
    P: Send + 'static,
{
    pub fn new(repository: DynResourceRepository<E, C, P>) -> Self {
        Self { repository }
    }

    pub fn schema(&self) -> &'static EntitySchema {
        self.repository.schema()
    }

    /// Refines raw query parameters through the query builder and runs the
    /// list. An optional parent scope (e.g. one tour's reviews) is injected
    /// as an equality filter before execution.
    ///
    /// Returns the matched entities together with the refined query, which
    /// callers need for field projection.
    pub async fn list(
        &self,
        params: &HashMap<String, String>,
        scope: Option<(&str, i64)>,
    ) -> Result<(Vec<E>, ListQuery), AppError> {
        let mut query = ListQuery::parse(params, self.repository.schema())?;
        if let Some((column, id)) = scope {
            query.push_scope(column, id)?;
        }

        let entities = self.repository.list(&query).await?;
        Ok((entities, query))
    }

    /// Fetches one entity by id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] when the id does not exist.
    pub async fn get(&self, id: i64) -> Result<E, AppError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| self.not_found(id))
    }

    /// Validates and persists a new entity.
    pub async fn create(&self, input: C) -> Result<E, AppError> {
        self.repository.create(input).await
    }

    /// Partially updates an entity by id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] when the id does not exist.
    pub async fn update(&self, id: i64, patch: P) -> Result<E, AppError> {
        self.repository
            .update(id, patch)
            .await?
            .ok_or_else(|| self.not_found(id))
    }

    /// Deletes an entity by id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] when the id does not exist.
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        if self.repository.delete(id).await? {
            Ok(())
        } else {
            Err(self.not_found(id))
        }
    }

    fn not_found(&self, id: i64) -> AppError {
        AppError::not_found(
            format!("No {} found with that id", self.repository.schema().resource),
            json!({ "id": id }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::query::{Column, ColumnKind};
    use crate::domain::repositories::ResourceRepository;
    use async_trait::async_trait;
    use std::sync::Arc;

    static WIDGET_SCHEMA: EntitySchema = EntitySchema {
        resource: "widget",
        columns: &[
            Column {
                name: "id",
                sql: "id",
                kind: ColumnKind::BigInt,
                filterable: true,
                sortable: true,
            },
            Column {
                name: "created_at",
                sql: "created_at",
                kind: ColumnKind::Timestamp,
                filterable: true,
                sortable: true,
            },
        ],
    };

    /// Fixed-response repository; `None`/`false` everywhere means "absent".
    struct StubRepo {
        present: bool,
    }

    #[async_trait]
    impl ResourceRepository for StubRepo {
        type Entity = i64;
        type Create = i64;
        type Patch = i64;

        fn schema(&self) -> &'static EntitySchema {
            &WIDGET_SCHEMA
        }

        async fn list(&self, query: &ListQuery) -> Result<Vec<i64>, AppError> {
            // Echo back the scope filter so tests can observe injection.
            Ok(query
                .filters
                .iter()
                .filter_map(|f| match f.value {
                    crate::domain::query::FilterValue::BigInt(v) => Some(v),
                    _ => None,
                })
                .collect())
        }

        async fn find_by_id(&self, id: i64) -> Result<Option<i64>, AppError> {
            Ok(self.present.then_some(id))
        }

        async fn create(&self, input: i64) -> Result<i64, AppError> {
            Ok(input)
        }

        async fn update(&self, id: i64, _patch: i64) -> Result<Option<i64>, AppError> {
            Ok(self.present.then_some(id))
        }

        async fn delete(&self, _id: i64) -> Result<bool, AppError> {
            Ok(self.present)
        }
    }

    fn service(present: bool) -> ResourceService<i64, i64, i64> {
        ResourceService::new(Arc::new(StubRepo { present }))
    }

    #[tokio::test]
    async fn test_get_present() {
        assert_eq!(service(true).get(5).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_get_absent_is_not_found_with_resource_name() {
        let err = service(false).get(5).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
        assert!(err.to_string().contains("widget"));
    }

    #[tokio::test]
    async fn test_update_absent_is_not_found() {
        let err = service(false).update(5, 1).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_absent_is_not_found() {
        assert!(service(true).delete(5).await.is_ok());
        let err = service(false).delete(5).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_injects_parent_scope() {
        let (items, query) = service(true)
            .list(&HashMap::new(), Some(("id", 42)))
            .await
            .unwrap();
        assert_eq!(items, vec![42]);
        assert_eq!(query.filters.len(), 1);
    }

    #[tokio::test]
    async fn test_list_rejects_bad_params() {
        let params: HashMap<String, String> =
            [("bogus".to_string(), "1".to_string())].into_iter().collect();
        let err = service(true).list(&params, None).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }
}
