//! User entity and its query schema.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::query::{Column, ColumnKind, EntitySchema};

/// Authorization role of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "kebab-case")]
#[sqlx(type_name = "user_role", rename_all = "kebab-case")]
pub enum Role {
    Admin,
    User,
    Guide,
    LeadGuide,
}

impl Default for Role {
    fn default() -> Self {
        Self::User
    }
}

/// A registered user.
///
/// Credential material (`password_hash`, reset token fields) is carried
/// internally but never serialized into responses.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub photo: Option<String>,
    pub role: Role,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub password_changed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing)]
    pub password_reset_token: Option<String>,
    #[serde(skip_serializing)]
    pub password_reset_expires: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Whether the password was changed after a session token issued at
    /// `token_iat` (unix seconds). Comparison is at whole-second resolution,
    /// matching the token's timestamp granularity.
    pub fn changed_password_after(&self, token_iat: i64) -> bool {
        self.password_changed_at
            .is_some_and(|changed| token_iat < changed.timestamp())
    }
}

/// Input data for creating a user. The password arrives already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub photo: Option<String>,
    pub role: Role,
    pub password_hash: String,
}

/// Partial update for a user. Password fields are deliberately absent; the
/// password changes only through the dedicated auth operations.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub photo: Option<Option<String>>,
    pub role: Option<Role>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.photo.is_none() && self.role.is_none()
    }
}

/// Columns users expose to list-query filtering and sorting. Credential
/// fields are not listed and therefore can never be filtered on.
pub static USER_SCHEMA: EntitySchema = EntitySchema {
    resource: "user",
    columns: &[
        Column {
            name: "id",
            sql: "id",
            kind: ColumnKind::BigInt,
            filterable: true,
            sortable: true,
        },
        Column {
            name: "name",
            sql: "name",
            kind: ColumnKind::Text,
            filterable: true,
            sortable: true,
        },
        Column {
            name: "email",
            sql: "email",
            kind: ColumnKind::Text,
            filterable: true,
            sortable: true,
        },
        Column {
            name: "role",
            sql: "role::text",
            kind: ColumnKind::Text,
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
