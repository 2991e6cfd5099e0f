//! Review CRUD wired to the rating aggregation worker.

use std::collections::HashMap;
use tokio::sync::mpsc;

use crate::application::services::resource_service::ResourceService;
use crate::domain::entities::{NewReview, Review, ReviewPatch};
use crate::domain::query::ListQuery;
use crate::domain::rating_event::RatingEvent;
use crate::domain::repositories::DynResourceRepository;
use crate::error::AppError;

/// Service for review management.
///
/// Every mutation path — create, update, delete — ends in
/// [`Self::notify_rating_change`], the single point that enqueues the owning
/// tour's rating recomputation. The enqueue is best-effort: the review write
/// is already durable, and the worker converges on the next event if one is
/// dropped.
pub struct ReviewService {
    resource: ResourceService<Review, NewReview, ReviewPatch>,
    rating_tx: mpsc::Sender<RatingEvent>,
}

impl ReviewService {
    pub fn new(
        repository: DynResourceRepository<Review, NewReview, ReviewPatch>,
        rating_tx: mpsc::Sender<RatingEvent>,
    ) -> Self {
        Self {
            resource: ResourceService::new(repository),
            rating_tx,
        }
    }

    /// Lists reviews, optionally scoped to one tour (nested route).
    pub async fn list(
        &self,
        params: &HashMap<String, String>,
        tour_id: Option<i64>,
    ) -> Result<(Vec<Review>, ListQuery), AppError> {
        self.resource
            .list(params, tour_id.map(|id| ("tour_id", id)))
            .await
    }

    pub async fn get(&self, id: i64) -> Result<Review, AppError> {
        self.resource.get(id).await
    }

    pub async fn create(&self, new_review: NewReview) -> Result<Review, AppError> {
        let review = self.resource.create(new_review).await?;
        self.notify_rating_change(review.tour_id).await;
        Ok(review)
    }

    pub async fn update(&self, id: i64, patch: ReviewPatch) -> Result<Review, AppError> {
        let review = self.resource.update(id, patch).await?;
        self.notify_rating_change(review.tour_id).await;
        Ok(review)
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        // The tour id is needed after the row is gone.
        let review = self.resource.get(id).await?;
        self.resource.delete(id).await?;
        self.notify_rating_change(review.tour_id).await;
        Ok(())
    }

    async fn notify_rating_change(&self, tour_id: i64) {
        if self
            .rating_tx
            .send(RatingEvent { tour_id })
            .await
            .is_err()
        {
            tracing::warn!(tour_id, "Rating worker unavailable, recomputation skipped");
        }
    }
}
