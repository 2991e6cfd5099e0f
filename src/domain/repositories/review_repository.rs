//! Repository trait for review aggregate queries.

use async_trait::async_trait;

use crate::error::AppError;

/// Count and mean of the ratings currently attached to one tour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingStats {
    pub quantity: i64,
    pub average: f64,
}

/// Review operations beyond the generic resource CRUD.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Computes the rating statistics for a tour from its current reviews.
    ///
    /// Returns `None` when the tour has no reviews.
    async fn rating_stats(&self, tour_id: i64) -> Result<Option<RatingStats>, AppError>;
}
