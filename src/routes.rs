//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET /health`       - Liveness and rating-queue headroom (public)
//! - `/api/v1/tours`     - Tour CRUD, aggregates, nested reviews
//! - `/api/v1/users`     - Auth and user management
//! - `/api/v1/reviews`   - Review CRUD (authenticated)
//! - anything else       - 404 through the error normalization layer
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Authentication** - Bearer token guard on protected routes
//! - **Path normalization** - Trailing slash handling

use axum::http::Uri;
use axum::routing::get;
use axum::Router;
use serde_json::json;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

use crate::api;
use crate::api::handlers::health_handler;
use crate::api::middleware::tracing;
use crate::error::AppError;
use crate::state::AppState;

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(api_router(state))
}

/// The router without the path-normalization wrapper; integration tests
/// drive this directly.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .nest("/api/v1/tours", api::routes::tour_routes(state.clone()))
        .nest("/api/v1/users", api::routes::user_routes(state.clone()))
        .nest("/api/v1/reviews", api::routes::review_routes(state.clone()))
        .fallback(fallback_handler)
        .with_state(state)
        .layer(tracing::layer())
}

/// Routes every unmatched path into the normalized 404 shape.
async fn fallback_handler(uri: Uri) -> AppError {
    AppError::not_found(format!("Cannot find {uri} on this server"), json!({}))
}
