//! Health check endpoint.

use axum::{Json, extract::State};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub rating_queue: QueueHealth,
}

/// Free and total capacity of the rating aggregation queue.
#[derive(Debug, Serialize)]
pub struct QueueHealth {
    pub available: usize,
    pub capacity: usize,
}

/// Reports service liveness and rating-queue headroom.
///
/// # Endpoint
///
/// `GET /health`
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        rating_queue: QueueHealth {
            available: state.rating_tx.capacity(),
            capacity: state.rating_tx.max_capacity(),
        },
    })
}
