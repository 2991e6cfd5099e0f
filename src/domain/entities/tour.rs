//! Tour entity and its query schema.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;

use crate::domain::query::{Column, ColumnKind, EntitySchema};

/// Tour difficulty grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "difficulty", rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Difficult,
}

/// A geographic point with optional human-readable context.
///
/// `coordinates` is `[longitude, latitude]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub coordinates: [f64; 2],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A stop on the tour itinerary: a geo point plus the day offset it is
/// visited on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TourLocation {
    pub coordinates: [f64; 2],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<i32>,
}

/// A bookable tour.
///
/// `ratings_average` and `ratings_quantity` are derived from reviews and are
/// never written by clients; see the rating aggregation worker.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Tour {
    pub id: i64,
    pub name: String,
    pub slug: String,
    /// Length in days.
    pub duration: i32,
    pub max_group_size: i32,
    pub difficulty: Difficulty,
    pub ratings_average: f64,
    pub ratings_quantity: i32,
    pub price: f64,
    pub price_discount: Option<f64>,
    pub summary: String,
    pub description: Option<String>,
    pub image_cover: String,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub start_dates: Vec<DateTime<Utc>>,
    /// Excluded from every default list/find/aggregate.
    pub secret_tour: bool,
    pub start_location: Json<GeoPoint>,
    pub locations: Json<Vec<TourLocation>>,
    /// Ids of the guide users leading this tour.
    pub guides: Vec<i64>,
}

impl Tour {
    /// Tour length in weeks, derived from `duration`.
    pub fn duration_weeks(&self) -> f64 {
        f64::from(self.duration) / 7.0
    }
}

/// Input data for creating a tour. The slug is derived from the name by the
/// service layer before this reaches the repository.
#[derive(Debug, Clone)]
pub struct NewTour {
    pub name: String,
    pub slug: String,
    pub duration: i32,
    pub max_group_size: i32,
    pub difficulty: Difficulty,
    pub price: f64,
    pub price_discount: Option<f64>,
    pub summary: String,
    pub description: Option<String>,
    pub image_cover: String,
    pub images: Vec<String>,
    pub start_dates: Vec<DateTime<Utc>>,
    pub secret_tour: bool,
    pub start_location: GeoPoint,
    pub locations: Vec<TourLocation>,
    pub guides: Vec<i64>,
}

/// Partial update for a tour. `None` fields are left unchanged.
///
/// `price_discount: Some(None)` clears the discount; `Some(Some(v))` sets it.
/// Rating fields are deliberately absent: they are only written by the
/// aggregation worker.
#[derive(Debug, Clone, Default)]
pub struct TourPatch {
    pub name: Option<String>,
    /// Recomputed from `name` by the service whenever the name changes.
    pub slug: Option<String>,
    pub duration: Option<i32>,
    pub max_group_size: Option<i32>,
    pub difficulty: Option<Difficulty>,
    pub price: Option<f64>,
    pub price_discount: Option<Option<f64>>,
    pub summary: Option<String>,
    pub description: Option<Option<String>>,
    pub image_cover: Option<String>,
    pub images: Option<Vec<String>>,
    pub start_dates: Option<Vec<DateTime<Utc>>>,
    pub secret_tour: Option<bool>,
    pub start_location: Option<GeoPoint>,
    pub locations: Option<Vec<TourLocation>>,
    pub guides: Option<Vec<i64>>,
}

impl TourPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.slug.is_none()
            && self.duration.is_none()
            && self.max_group_size.is_none()
            && self.difficulty.is_none()
            && self.price.is_none()
            && self.price_discount.is_none()
            && self.summary.is_none()
            && self.description.is_none()
            && self.image_cover.is_none()
            && self.images.is_none()
            && self.start_dates.is_none()
            && self.secret_tour.is_none()
            && self.start_location.is_none()
            && self.locations.is_none()
            && self.guides.is_none()
    }
}

/// Columns tours expose to list-query filtering and sorting.
pub static TOUR_SCHEMA: EntitySchema = EntitySchema {
    resource: "tour",
    columns: &[
        Column {
            name: "id",
            sql: "id",
            kind: ColumnKind::BigInt,
            filterable: true,
            sortable: true,
        },
        Column {
            name: "name",
            sql: "name",
            kind: ColumnKind::Text,
            filterable: true,
            sortable: true,
        },
        Column {
            name: "slug",
            sql: "slug",
            kind: ColumnKind::Text,
            filterable: true,
            sortable: false,
        },
        Column {
            name: "duration",
            sql: "duration",
            kind: ColumnKind::Integer,
            filterable: true,
            sortable: true,
        },
        Column {
            name: "max_group_size",
            sql: "max_group_size",
            kind: ColumnKind::Integer,
            filterable: true,
            sortable: true,
        },
        Column {
            name: "difficulty",
            sql: "difficulty::text",
            kind: ColumnKind::Text,
            filterable: true,
            sortable: true,
        },
        Column {
            name: "ratings_average",
            sql: "ratings_average",
            kind: ColumnKind::Float,
            filterable: true,
            sortable: true,
        },
        Column {
            name: "ratings_quantity",
            sql: "ratings_quantity",
            kind: ColumnKind::Integer,
            filterable: true,
            sortable: true,
        },
        Column {
            name: "price",
            sql: "price",
            kind: ColumnKind::Float,
            filterable: true,
            sortable: true,
        },
        Column {
            name: "price_discount",
            sql: "price_discount",
            kind: ColumnKind::Float,
            filterable: true,
            sortable: true,
        },
        Column {
            name: "created_at",
            sql: "created_at",
            kind: ColumnKind::Timestamp,
            filterable: true,
            sortable: true,
        },
    ],
};
