//! PostgreSQL implementation of review repositories.

use async_trait::async_trait;
use sqlx::{PgPool, QueryBuilder};
use std::sync::Arc;

use crate::domain::entities::{NewReview, REVIEW_SCHEMA, Review, ReviewPatch};
use crate::domain::query::{EntitySchema, ListQuery};
use crate::domain::repositories::{RatingStats, ResourceRepository, ReviewRepository};
use crate::error::AppError;
use crate::infrastructure::persistence::sql;

/// PostgreSQL repository for review storage and rating aggregates.
pub struct PgReviewRepository {
    pool: Arc<PgPool>,
}

impl PgReviewRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResourceRepository for PgReviewRepository {
    type Entity = Review;
    type Create = NewReview;
    type Patch = ReviewPatch;

    fn schema(&self) -> &'static EntitySchema {
        &REVIEW_SCHEMA
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<Review>, AppError> {
        let mut qb = QueryBuilder::new("SELECT * FROM reviews WHERE TRUE");
        sql::push_filters(&mut qb, query);
        sql::push_order_and_page(&mut qb, query);

        let reviews = qb
            .build_query_as::<Review>()
            .fetch_all(self.pool.as_ref())
            .await?;
        Ok(reviews)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Review>, AppError> {
        let review = sqlx::query_as::<_, Review>("SELECT * FROM reviews WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;
        Ok(review)
    }

    async fn create(&self, new_review: NewReview) -> Result<Review, AppError> {
        let review = sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (review, rating, tour_id, user_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(new_review.review)
        .bind(new_review.rating)
        .bind(new_review.tour_id)
        .bind(new_review.user_id)
        .fetch_one(self.pool.as_ref())
        .await?;
        Ok(review)
    }

    async fn update(&self, id: i64, patch: ReviewPatch) -> Result<Option<Review>, AppError> {
        if patch.is_empty() {
            return self.find_by_id(id).await;
        }

        let mut qb = QueryBuilder::new("UPDATE reviews SET ");
        let mut set = qb.separated(", ");

        if let Some(review) = patch.review {
            set.push("review = ");
            set.push_bind_unseparated(review);
        }
        if let Some(rating) = patch.rating {
            set.push("rating = ");
            set.push_bind_unseparated(rating);
        }

        qb.push(" WHERE id = ");
        qb.push_bind(id);
        qb.push(" RETURNING *");

        let review = qb
            .build_query_as::<Review>()
            .fetch_optional(self.pool.as_ref())
            .await?;
        Ok(review)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ReviewRepository for PgReviewRepository {
    async fn rating_stats(&self, tour_id: i64) -> Result<Option<RatingStats>, AppError> {
        let (quantity, average): (i64, Option<f64>) = sqlx::query_as(
            "SELECT COUNT(*), AVG(rating::float8) FROM reviews WHERE tour_id = $1",
        )
        .bind(tour_id)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(average.map(|average| RatingStats { quantity, average }))
    }
}
