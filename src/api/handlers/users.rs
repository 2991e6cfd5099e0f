//! Handlers for user management endpoints.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde_json::Value;
use std::collections::HashMap;
use validator::Validate;

use crate::api::dto::user::UpdateUserRequest;
use crate::api::dto::{document_envelope, list_envelope, parse_id, to_json_value, to_projected_values};
use crate::api::middleware::auth::CurrentUser;
use crate::error::AppError;
use crate::state::AppState;

/// Lists users with filtering, sorting, field selection, and pagination.
///
/// # Endpoint
///
/// `GET /api/v1/users` (authenticated)
pub async fn list_users_handler(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, AppError> {
    let (users, query) = state.user_service.list(&params).await?;

    let values = to_projected_values(users, query.fields.as_deref())?;
    Ok(Json(list_envelope("users", values)))
}

/// The authenticated caller's own record.
///
/// # Endpoint
///
/// `GET /api/v1/users/me`
pub async fn get_me_handler(user: CurrentUser) -> Result<Json<Value>, AppError> {
    Ok(Json(document_envelope("user", to_json_value(user.0)?)))
}

/// Fetches one user. Admin only.
///
/// # Endpoint
///
/// `GET /api/v1/users/{id}`
pub async fn get_user_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_id(&id)?;
    let user = state.user_service.get(id).await?;
    Ok(Json(document_envelope("user", to_json_value(user)?)))
}

/// Partially updates a user. Admin only; never touches password fields.
///
/// # Endpoint
///
/// `PATCH /api/v1/users/{id}`
pub async fn update_user_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<Value>, AppError> {
    payload.validate()?;

    let id = parse_id(&id)?;
    let user = state.user_service.update(id, payload.into()).await?;
    Ok(Json(document_envelope("user", to_json_value(user)?)))
}

/// Deletes a user. Admin only.
///
/// # Endpoint
///
/// `DELETE /api/v1/users/{id}`
pub async fn delete_user_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id)?;
    state.user_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
