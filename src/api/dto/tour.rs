//! DTOs for tour endpoints.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use std::sync::LazyLock;
use validator::Validate;

use crate::domain::entities::{Difficulty, GeoPoint, NewTour, Tour, TourLocation, TourPatch};
use crate::domain::repositories::TourDetail;

/// Compiled regex for tour name validation: letters and spaces only.
static TOUR_NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z ]+$").unwrap());

/// Request body for `POST /api/v1/tours`.
///
/// Rating fields are not accepted here; they are derived from reviews.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTourRequest {
    #[validate(
        length(min = 10, max = 40, message = "Tour name must be 10-40 characters"),
        regex(path = "*TOUR_NAME_REGEX", message = "Tour name may only contain letters and spaces")
    )]
    pub name: String,

    #[validate(range(min = 1, message = "A tour must have a duration"))]
    pub duration: i32,

    #[validate(range(min = 1, message = "A tour must have a max group size"))]
    pub max_group_size: i32,

    pub difficulty: Difficulty,

    #[validate(range(min = 0.0, message = "Price must not be negative"))]
    pub price: f64,

    /// Must be strictly below `price`; checked by the service against the
    /// effective price.
    pub price_discount: Option<f64>,

    #[validate(length(min = 1, message = "A tour must have a summary"))]
    pub summary: String,

    pub description: Option<String>,

    #[validate(length(min = 1, message = "A tour must have a cover image"))]
    pub image_cover: String,

    #[serde(default)]
    pub images: Vec<String>,

    #[serde(default)]
    pub start_dates: Vec<DateTime<Utc>>,

    #[serde(default)]
    pub secret_tour: bool,

    pub start_location: GeoPoint,

    #[serde(default)]
    pub locations: Vec<TourLocation>,

    #[serde(default)]
    pub guides: Vec<i64>,
}

impl From<CreateTourRequest> for NewTour {
    fn from(request: CreateTourRequest) -> Self {
        NewTour {
            name: request.name,
            // Derived from the name by the service before persistence.
            slug: String::new(),
            duration: request.duration,
            max_group_size: request.max_group_size,
            difficulty: request.difficulty,
            price: request.price,
            price_discount: request.price_discount,
            summary: request.summary,
            description: request.description,
            image_cover: request.image_cover,
            images: request.images,
            start_dates: request.start_dates,
            secret_tour: request.secret_tour,
            start_location: request.start_location,
            locations: request.locations,
            guides: request.guides,
        }
    }
}

/// Request body for `PATCH /api/v1/tours/{id}`.
///
/// All fields are optional — only provided fields are changed.
/// `price_discount` and `description` distinguish absent (no change) from
/// `null` (clear).
#[serde_as]
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTourRequest {
    #[validate(
        length(min = 10, max = 40, message = "Tour name must be 10-40 characters"),
        regex(path = "*TOUR_NAME_REGEX", message = "Tour name may only contain letters and spaces")
    )]
    pub name: Option<String>,

    #[validate(range(min = 1))]
    pub duration: Option<i32>,

    #[validate(range(min = 1))]
    pub max_group_size: Option<i32>,

    pub difficulty: Option<Difficulty>,

    #[validate(range(min = 0.0))]
    pub price: Option<f64>,

    /// Absent = no change, null = clear, value = set.
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub price_discount: Option<Option<f64>>,

    #[validate(length(min = 1))]
    pub summary: Option<String>,

    /// Absent = no change, null = clear, value = set.
    #[serde(default, with = "::serde_with::rust::double_option")]
    pub description: Option<Option<String>>,

    #[validate(length(min = 1))]
    pub image_cover: Option<String>,

    pub images: Option<Vec<String>>,

    pub start_dates: Option<Vec<DateTime<Utc>>>,

    pub secret_tour: Option<bool>,

    pub start_location: Option<GeoPoint>,

    pub locations: Option<Vec<TourLocation>>,

    pub guides: Option<Vec<i64>>,
}

impl From<UpdateTourRequest> for TourPatch {
    fn from(request: UpdateTourRequest) -> Self {
        TourPatch {
            name: request.name,
            slug: None,
            duration: request.duration,
            max_group_size: request.max_group_size,
            difficulty: request.difficulty,
            price: request.price,
            price_discount: request.price_discount,
            summary: request.summary,
            description: request.description,
            image_cover: request.image_cover,
            images: request.images,
            start_dates: request.start_dates,
            secret_tour: request.secret_tour,
            start_location: request.start_location,
            locations: request.locations,
            guides: request.guides,
        }
    }
}

/// JSON representation of a tour, adding the derived `duration_weeks`.
#[derive(Debug, Serialize)]
pub struct TourResponse {
    #[serde(flatten)]
    pub tour: Tour,
    pub duration_weeks: f64,
}

impl From<Tour> for TourResponse {
    fn from(tour: Tour) -> Self {
        let duration_weeks = tour.duration_weeks();
        Self {
            tour,
            duration_weeks,
        }
    }
}

/// A tour with its reference fields expanded: guide users embedded and the
/// virtual review relation populated.
#[derive(Debug, Serialize)]
pub struct TourDetailResponse {
    #[serde(flatten)]
    pub tour: TourResponse,
    pub guides: Vec<crate::domain::entities::User>,
    pub reviews: Vec<crate::domain::entities::Review>,
}

impl From<TourDetail> for TourDetailResponse {
    fn from(detail: TourDetail) -> Self {
        Self {
            tour: TourResponse::from(detail.tour),
            guides: detail.guides,
            reviews: detail.reviews,
        }
    }
}
