//! Shared application state injected into handlers.

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::application::services::{AuthService, ReviewService, TourService, UserService};
use crate::domain::rating_event::RatingEvent;

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub tour_service: Arc<TourService>,
    pub user_service: Arc<UserService>,
    pub review_service: Arc<ReviewService>,
    /// Kept for health reporting; review mutations go through the service.
    pub rating_tx: mpsc::Sender<RatingEvent>,
}
