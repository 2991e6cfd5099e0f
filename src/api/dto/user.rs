//! DTOs for user management endpoints.

use serde::Deserialize;
use serde_with::serde_as;
use validator::Validate;

use crate::domain::entities::{Role, UserPatch};

/// Request body for `PATCH /api/v1/users/{id}` (admin).
///
/// Deliberately has no password fields: passwords change only through the
/// dedicated auth endpoints so hashing and token invalidation always apply.
#[serde_as]
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, message = "A user must have a name"))]
    pub name: Option<String>,

    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,

    /// Absent = no change, null = clear, value = set.
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub photo: Option<Option<String>>,

    pub role: Option<Role>,
}

impl From<UpdateUserRequest> for UserPatch {
    fn from(request: UpdateUserRequest) -> Self {
        UserPatch {
            name: request.name,
            email: request.email,
            photo: request.photo,
            role: request.role,
        }
    }
}
