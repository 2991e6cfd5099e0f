//! Asynchronous recomputation of tour rating statistics.
//!
//! Every review mutation sends a [`RatingEvent`] to one channel; this worker
//! is the single entry point that recomputes and writes back a tour's
//! `ratings_average` / `ratings_quantity`. The write is best-effort relative
//! to the request that triggered it: under concurrent review writes the last
//! recomputation to complete wins, which converges because each run reads
//! the full review set.

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_retry::Retry;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

use crate::domain::rating_event::RatingEvent;
use crate::domain::repositories::{ReviewRepository, TourRepository};
use crate::error::AppError;

/// Average reported for a tour with no reviews: "no data", not "worst
/// score".
pub const DEFAULT_RATINGS_AVERAGE: f64 = 4.5;

/// Consumes rating events until the channel closes, retrying transient
/// failures with jittered exponential backoff.
pub async fn run_rating_worker(
    mut rx: mpsc::Receiver<RatingEvent>,
    reviews: Arc<dyn ReviewRepository>,
    tours: Arc<dyn TourRepository>,
) {
    while let Some(event) = rx.recv().await {
        let strategy = ExponentialBackoff::from_millis(50).map(jitter).take(3);
        let result = Retry::spawn(strategy, || {
            recompute_tour_ratings(event.tour_id, reviews.as_ref(), tours.as_ref())
        })
        .await;

        if let Err(e) = result {
            tracing::error!(
                tour_id = event.tour_id,
                error = %e,
                "Failed to recompute tour rating statistics"
            );
        }
    }
}

/// Recomputes count and mean of a tour's ratings and writes them back.
///
/// A tour with no remaining reviews resets to a quantity of 0 and the
/// default average. The mean is rounded to 2 decimals before the write.
pub async fn recompute_tour_ratings(
    tour_id: i64,
    reviews: &dyn ReviewRepository,
    tours: &dyn TourRepository,
) -> Result<(), AppError> {
    let (quantity, average) = match reviews.rating_stats(tour_id).await? {
        Some(stats) => (stats.quantity, round_to_2_decimals(stats.average)),
        None => (0, DEFAULT_RATINGS_AVERAGE),
    };

    tours.update_rating_stats(tour_id, quantity, average).await
}

fn round_to_2_decimals(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
