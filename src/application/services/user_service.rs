//! User management service.

use std::collections::HashMap;

use crate::application::services::resource_service::ResourceService;
use crate::domain::entities::{NewUser, User, UserPatch};
use crate::domain::query::ListQuery;
use crate::domain::repositories::DynResourceRepository;
use crate::error::AppError;

/// Service for administrative user management.
///
/// Password changes never pass through here — [`UserPatch`] has no password
/// fields; the credential lifecycle belongs to
/// [`crate::application::services::AuthService`].
pub struct UserService {
    resource: ResourceService<User, NewUser, UserPatch>,
}

impl UserService {
    pub fn new(repository: DynResourceRepository<User, NewUser, UserPatch>) -> Self {
        Self {
            resource: ResourceService::new(repository),
        }
    }

    pub async fn list(
        &self,
        params: &HashMap<String, String>,
    ) -> Result<(Vec<User>, ListQuery), AppError> {
        self.resource.list(params, None).await
    }

    pub async fn get(&self, id: i64) -> Result<User, AppError> {
        self.resource.get(id).await
    }

    pub async fn update(&self, id: i64, patch: UserPatch) -> Result<User, AppError> {
        self.resource.update(id, patch).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        self.resource.delete(id).await
    }
}
