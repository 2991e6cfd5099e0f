//! Repository trait for tour-specific data access.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::entities::{Difficulty, Review, Tour, User};
use crate::error::AppError;

/// A tour expanded with its referenced entities: the guide users and the
/// virtual review relation (computed by lookup, not stored on the tour).
#[derive(Debug)]
pub struct TourDetail {
    pub tour: Tour,
    pub guides: Vec<User>,
    pub reviews: Vec<Review>,
}

/// Aggregate statistics for one difficulty grade.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DifficultyStats {
    pub difficulty: Difficulty,
    pub num_tours: i64,
    pub num_ratings: i64,
    pub avg_rating: f64,
    pub avg_price: f64,
    pub min_price: f64,
    pub max_price: f64,
}

/// Number of tour starts in one month of a year.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MonthStarts {
    pub month: i32,
    pub num_tour_starts: i64,
    pub tours: Vec<String>,
}

/// Tour operations beyond the generic resource CRUD.
///
/// Secret tours are excluded from every method here, same as from the
/// generic operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TourRepository: Send + Sync {
    /// Fetches a tour with guides and reviews populated.
    async fn find_detailed(&self, id: i64) -> Result<Option<TourDetail>, AppError>;

    /// Aggregates rating/price statistics per difficulty over well-rated
    /// tours (ratings_average >= 4.5), ordered by average price.
    async fn stats_by_difficulty(&self) -> Result<Vec<DifficultyStats>, AppError>;

    /// Counts tour starts per month of `year` from the unnested start dates;
    /// busiest months first, capped at 6.
    async fn monthly_plan(&self, year: i32) -> Result<Vec<MonthStarts>, AppError>;

    /// Tours whose start location lies within `radius_radians` (great-circle
    /// central angle) of the given point.
    async fn within_radius(
        &self,
        lng: f64,
        lat: f64,
        radius_radians: f64,
    ) -> Result<Vec<Tour>, AppError>;

    /// Writes the derived rating statistics back onto a tour. Only the
    /// rating aggregation worker calls this.
    async fn update_rating_stats(
        &self,
        tour_id: i64,
        quantity: i64,
        average: f64,
    ) -> Result<(), AppError>;
}
