//! DTOs for authentication endpoints.

use serde::Deserialize;
use validator::Validate;

use crate::domain::entities::Role;

/// Request body for `POST /api/v1/users/signup`.
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 1, message = "A user must have a name"))]
    pub name: String,

    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Write-only confirmation; must equal `password` and is discarded
    /// before persistence.
    #[validate(must_match(other = "password", message = "Passwords must match"))]
    pub password_confirm: String,

    /// Defaults to the regular user role when absent.
    pub role: Option<Role>,
}

/// Request body for `POST /api/v1/users/login`.
///
/// Fields are optional so an incomplete body reaches the handler, which
/// answers with a 400 rather than a generic deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Request body for `POST /api/v1/users/forgot_password`.
#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
}

/// Request body for `PATCH /api/v1/users/reset_password/{token}`.
#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(must_match(other = "password", message = "Passwords must match"))]
    pub password_confirm: String,
}

/// Request body for `PATCH /api/v1/users/update_my_password`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePasswordRequest {
    pub password_current: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(must_match(other = "password", message = "Passwords must match"))]
    pub password_confirm: String,
}
