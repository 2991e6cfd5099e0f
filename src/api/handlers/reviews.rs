//! Handlers for review endpoints.
//!
//! Reviews are reachable standalone (`/api/v1/reviews`) and nested under a
//! tour (`/api/v1/tours/{id}/reviews`); the nested path scopes listing and
//! supplies the tour for creation.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde_json::{Value, json};
use std::collections::HashMap;
use validator::Validate;

use crate::api::dto::review::{CreateReviewRequest, UpdateReviewRequest};
use crate::api::dto::{document_envelope, list_envelope, parse_id, to_json_value, to_projected_values};
use crate::api::middleware::auth::CurrentUser;
use crate::domain::entities::NewReview;
use crate::error::AppError;
use crate::state::AppState;

/// Lists reviews, scoped to one tour on the nested route.
///
/// # Endpoints
///
/// - `GET /api/v1/reviews`
/// - `GET /api/v1/tours/{id}/reviews`
pub async fn list_reviews_handler(
    State(state): State<AppState>,
    tour_id: Option<Path<i64>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, AppError> {
    let (reviews, query) = state
        .review_service
        .list(&params, tour_id.map(|Path(id)| id))
        .await?;

    let values = to_projected_values(reviews, query.fields.as_deref())?;
    Ok(Json(list_envelope("reviews", values)))
}

/// Creates a review authored by the authenticated user. Restricted to the
/// regular user role.
///
/// # Endpoints
///
/// - `POST /api/v1/reviews` (tour id in the body)
/// - `POST /api/v1/tours/{id}/reviews` (tour id from the path)
pub async fn create_review_handler(
    State(state): State<AppState>,
    tour_id: Option<Path<i64>>,
    user: CurrentUser,
    Json(payload): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    payload.validate()?;

    let tour_id = tour_id
        .map(|Path(id)| id)
        .or(payload.tour_id)
        .ok_or_else(|| {
            AppError::bad_request("A review must belong to a tour", json!({}))
        })?;

    let review = state
        .review_service
        .create(NewReview {
            review: payload.review,
            rating: payload.rating,
            tour_id,
            user_id: user.0.id,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(document_envelope("review", to_json_value(review)?)),
    ))
}

/// Fetches one review.
///
/// # Endpoint
///
/// `GET /api/v1/reviews/{id}`
pub async fn get_review_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_id(&id)?;
    let review = state.review_service.get(id).await?;
    Ok(Json(document_envelope("review", to_json_value(review)?)))
}

/// Partially updates a review. The owning tour's rating statistics are
/// recomputed asynchronously afterwards.
///
/// # Endpoint
///
/// `PATCH /api/v1/reviews/{id}`
pub async fn update_review_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateReviewRequest>,
) -> Result<Json<Value>, AppError> {
    payload.validate()?;

    let id = parse_id(&id)?;
    let review = state.review_service.update(id, payload.into()).await?;
    Ok(Json(document_envelope("review", to_json_value(review)?)))
}

/// Deletes a review. The owning tour's rating statistics are recomputed
/// asynchronously afterwards.
///
/// # Endpoint
///
/// `DELETE /api/v1/reviews/{id}`
pub async fn delete_review_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id)?;
    state.review_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
