//! Review entity and its query schema.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::query::{Column, ColumnKind, EntitySchema};

/// A user's review of a tour.
///
/// At most one review exists per `(tour_id, user_id)` pair; the database
/// enforces this with a unique constraint.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Review {
    pub id: i64,
    pub review: String,
    /// 1 to 5.
    pub rating: i32,
    pub created_at: DateTime<Utc>,
    pub tour_id: i64,
    pub user_id: i64,
}

/// Input data for creating a review.
#[derive(Debug, Clone)]
pub struct NewReview {
    pub review: String,
    pub rating: i32,
    pub tour_id: i64,
    pub user_id: i64,
}

/// Partial update for a review. The tour and author references are fixed at
/// creation time.
#[derive(Debug, Clone, Default)]
pub struct ReviewPatch {
    pub review: Option<String>,
    pub rating: Option<i32>,
}

impl ReviewPatch {
    pub fn is_empty(&self) -> bool {
        self.review.is_none() && self.rating.is_none()
    }
}

/// Columns reviews expose to list-query filtering and sorting.
pub static REVIEW_SCHEMA: EntitySchema = EntitySchema {
    resource: "review",
    columns: &[
        Column {
            name: "id",
            sql: "id",
            kind: ColumnKind::BigInt,
            filterable: true,
            sortable: true,
        },
        Column {
            name: "rating",
            sql: "rating",
            kind: ColumnKind::Integer,
            filterable: true,
            sortable: true,
        },
        Column {
            name: "tour_id",
            sql: "tour_id",
            kind: ColumnKind::BigInt,
            filterable: true,
            sortable: false,
        },
        Column {
            name: "user_id",
            sql: "user_id",
            kind: ColumnKind::BigInt,
            filterable: true,
            sortable: false,
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
