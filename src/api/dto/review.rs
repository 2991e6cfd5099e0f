//! DTOs for review endpoints.

use serde::Deserialize;
use validator::Validate;

use crate::domain::entities::ReviewPatch;

/// Request body for creating a review.
///
/// On the nested route (`POST /api/v1/tours/{id}/reviews`) the tour comes
/// from the path and `tour_id` may be omitted. The author is always the
/// authenticated user.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateReviewRequest {
    #[validate(length(min = 1, message = "A review must contain some text"))]
    pub review: String,

    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,

    pub tour_id: Option<i64>,
}

/// Request body for `PATCH /api/v1/reviews/{id}`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateReviewRequest {
    #[validate(length(min = 1, message = "A review must contain some text"))]
    pub review: Option<String>,

    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: Option<i32>,
}

impl From<UpdateReviewRequest> for ReviewPatch {
    fn from(request: UpdateReviewRequest) -> Self {
        ReviewPatch {
            review: request.review,
            rating: request.rating,
        }
    }
}
