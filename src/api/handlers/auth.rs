//! Handlers for authentication endpoints.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::{Value, json};
use validator::Validate;

use crate::api::dto::auth::{
    ForgotPasswordRequest, LoginRequest, ResetPasswordRequest, SignupRequest,
    UpdatePasswordRequest,
};
use crate::api::dto::to_json_value;
use crate::api::middleware::auth::CurrentUser;
use crate::error::AppError;
use crate::state::AppState;

/// Registers a new user and returns a session token alongside the created
/// user (credential fields absent).
///
/// # Endpoint
///
/// `POST /api/v1/users/signup`
pub async fn signup_handler(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    payload.validate()?;

    let (user, token) = state
        .auth_service
        .signup(payload.name, payload.email, &payload.password, payload.role)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "token": token,
            "data": { "user": to_json_value(user)? },
        })),
    ))
}

/// Verifies credentials and returns a session token.
///
/// # Endpoint
///
/// `POST /api/v1/users/login`
///
/// # Errors
///
/// - 400 when email or password is missing from the body
/// - 401 for a wrong password or unknown email, with no signal
///   distinguishing which
pub async fn login_handler(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Value>, AppError> {
    let (Some(email), Some(password)) = (payload.email, payload.password) else {
        return Err(AppError::bad_request(
            "Email and password must be provided",
            json!({}),
        ));
    };

    let token = state.auth_service.login(&email, &password).await?;

    Ok(Json(json!({ "status": "success", "token": token })))
}

/// Issues a password reset token and dispatches it to the user's email.
///
/// # Endpoint
///
/// `POST /api/v1/users/forgot_password`
pub async fn forgot_password_handler(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<Json<Value>, AppError> {
    payload.validate()?;

    state.auth_service.forgot_password(&payload.email).await?;

    Ok(Json(json!({
        "status": "success",
        "message": "Token sent to email",
    })))
}

/// Consumes a reset token, sets the new password, and returns a fresh
/// session token.
///
/// # Endpoint
///
/// `PATCH /api/v1/users/reset_password/{token}`
pub async fn reset_password_handler(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<Value>, AppError> {
    payload.validate()?;

    let token = state
        .auth_service
        .reset_password(&token, &payload.password)
        .await?;

    Ok(Json(json!({ "status": "success", "token": token })))
}

/// Changes the authenticated user's password after verifying the current
/// one, and returns a fresh session token.
///
/// # Endpoint
///
/// `PATCH /api/v1/users/update_my_password`
pub async fn update_password_handler(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<UpdatePasswordRequest>,
) -> Result<Json<Value>, AppError> {
    payload.validate()?;

    let token = state
        .auth_service
        .update_password(&user.0, &payload.password_current, &payload.password)
        .await?;

    Ok(Json(json!({ "status": "success", "token": token })))
}
