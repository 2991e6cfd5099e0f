//! Handlers for tour endpoints.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde_json::{Value, json};
use std::collections::HashMap;
use validator::Validate;

use crate::api::dto::tour::{
    CreateTourRequest, TourDetailResponse, TourResponse, UpdateTourRequest,
};
use crate::api::dto::{document_envelope, list_envelope, parse_id, to_json_value, to_projected_values};
use crate::error::AppError;
use crate::state::AppState;

/// Lists tours with filtering, sorting, field selection, and pagination.
///
/// # Endpoint
///
/// `GET /api/v1/tours`
///
/// # Query Parameters
///
/// - Arbitrary field filters: `difficulty=easy`, `price[lt]=1000`,
///   `duration[gte]=5`
/// - `sort`: comma-separated fields, leading `-` for descending
/// - `fields`: comma-separated exact projection
/// - `page` (default 1), `limit` (default 100)
pub async fn list_tours_handler(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, AppError> {
    let (tours, query) = state.tour_service.list(&params).await?;

    let values = to_projected_values(
        tours.into_iter().map(TourResponse::from).collect::<Vec<_>>(),
        query.fields.as_deref(),
    )?;
    Ok(Json(list_envelope("tours", values)))
}

/// The five cheapest top-rated tours; an alias over the list endpoint.
///
/// # Endpoint
///
/// `GET /api/v1/tours/top-5-cheap`
pub async fn top_tours_handler(
    State(state): State<AppState>,
    Query(mut params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, AppError> {
    params.insert("limit".to_string(), "5".to_string());
    params.insert("sort".to_string(), "-ratings_average,price".to_string());
    params.insert(
        "fields".to_string(),
        "name,price,ratings_average,summary,difficulty".to_string(),
    );

    list_tours_handler(State(state), Query(params)).await
}

/// Fetches one tour with guides and reviews populated.
///
/// # Endpoint
///
/// `GET /api/v1/tours/{id}`
pub async fn get_tour_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_id(&id)?;
    let detail = state.tour_service.get_detailed(id).await?;

    Ok(Json(document_envelope(
        "tour",
        to_json_value(TourDetailResponse::from(detail))?,
    )))
}

/// Creates a tour. Restricted to admin and lead-guide roles.
///
/// # Endpoint
///
/// `POST /api/v1/tours`
pub async fn create_tour_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateTourRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    payload.validate()?;

    let tour = state.tour_service.create(payload.into()).await?;

    Ok((
        StatusCode::CREATED,
        Json(document_envelope(
            "tour",
            to_json_value(TourResponse::from(tour))?,
        )),
    ))
}

/// Partially updates a tour. Restricted to admin and lead-guide roles.
///
/// # Endpoint
///
/// `PATCH /api/v1/tours/{id}`
pub async fn update_tour_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateTourRequest>,
) -> Result<Json<Value>, AppError> {
    payload.validate()?;

    let id = parse_id(&id)?;
    let tour = state.tour_service.update(id, payload.into()).await?;

    Ok(Json(document_envelope(
        "tour",
        to_json_value(TourResponse::from(tour))?,
    )))
}

/// Deletes a tour. Restricted to admin and lead-guide roles.
///
/// # Endpoint
///
/// `DELETE /api/v1/tours/{id}`
pub async fn delete_tour_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id)?;
    state.tour_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Rating and price aggregates per difficulty.
///
/// # Endpoint
///
/// `GET /api/v1/tours/stats`
pub async fn tour_stats_handler(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let stats = state.tour_service.stats().await?;
    Ok(Json(document_envelope("stats", to_json_value(stats)?)))
}

/// Busiest months of a year by tour start count.
///
/// # Endpoint
///
/// `GET /api/v1/tours/busiest/{year}`
pub async fn monthly_plan_handler(
    State(state): State<AppState>,
    Path(year): Path<String>,
) -> Result<Json<Value>, AppError> {
    let year: i32 = year.parse().map_err(|_| {
        AppError::cast(format!("Invalid year: {year}"), json!({ "year": year }))
    })?;

    let plan = state.tour_service.monthly_plan(year).await?;
    Ok(Json(document_envelope("plan", to_json_value(plan)?)))
}

/// Tours starting within a radius of a point.
///
/// # Endpoint
///
/// `GET /api/v1/tours/within/{distance}/center/{latlng}/unit/{unit}`
///
/// `latlng` is `lat,lng`; `unit` is `mi` or `km`.
pub async fn tours_within_handler(
    State(state): State<AppState>,
    Path((distance, latlng, unit)): Path<(String, String, String)>,
) -> Result<Json<Value>, AppError> {
    let distance: f64 = distance.parse().map_err(|_| {
        AppError::cast(
            format!("Invalid distance: {distance}"),
            json!({ "distance": distance }),
        )
    })?;

    let (lat, lng) = latlng
        .split_once(',')
        .and_then(|(lat, lng)| Some((lat.trim().parse().ok()?, lng.trim().parse().ok()?)))
        .ok_or_else(|| {
            AppError::bad_request(
                "Please provide latitude and longitude in the format lat,lng",
                json!({ "latlng": latlng }),
            )
        })?;

    let tours = state.tour_service.within(distance, lat, lng, &unit).await?;

    let values = to_projected_values(
        tours.into_iter().map(TourResponse::from).collect::<Vec<_>>(),
        None,
    )?;
    Ok(Json(list_envelope("tours", values)))
}
