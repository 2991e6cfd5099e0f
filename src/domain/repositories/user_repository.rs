//! Repository trait for credential-aware user data access.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::{NewUser, User};
use crate::error::AppError;

/// User operations the auth flow needs beyond the generic resource CRUD.
///
/// Returned [`User`] values carry the password hash internally; the hash is
/// stripped at the serialization layer, never here.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persists a new user.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Duplicate`] when the email is already registered.
    async fn create(&self, user: NewUser) -> Result<User, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError>;

    /// Looks up a user by (lowercased) email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Finds the user holding `token_hash` as an unexpired reset token.
    async fn find_by_reset_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, AppError>;

    /// Replaces the password hash and stamps `password_changed_at`, which
    /// invalidates session tokens issued before `changed_at`.
    async fn update_password(
        &self,
        user_id: i64,
        password_hash: &str,
        changed_at: DateTime<Utc>,
    ) -> Result<(), AppError>;

    /// Stores a reset-token hash and its expiry on the user.
    async fn set_reset_token(
        &self,
        user_id: i64,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError>;

    /// Clears any stored reset token and expiry.
    async fn clear_reset_token(&self, user_id: i64) -> Result<(), AppError>;

    /// Sets a new password hash and clears the reset token in one statement,
    /// so a consumed token can never be replayed.
    async fn reset_password(
        &self,
        user_id: i64,
        password_hash: &str,
        changed_at: DateTime<Utc>,
    ) -> Result<(), AppError>;
}
