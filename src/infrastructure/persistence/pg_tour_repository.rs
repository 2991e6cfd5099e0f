//! PostgreSQL implementation of tour repositories.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde_json::json;
use sqlx::types::Json;
use sqlx::{PgPool, QueryBuilder};
use std::sync::Arc;

use crate::domain::entities::{NewTour, Review, TOUR_SCHEMA, Tour, TourPatch, User};
use crate::domain::query::{EntitySchema, ListQuery};
use crate::domain::repositories::{
    DifficultyStats, MonthStarts, ResourceRepository, TourDetail, TourRepository,
};
use crate::error::AppError;
use crate::infrastructure::persistence::sql;

/// PostgreSQL repository for tour storage and retrieval.
///
/// Every read and write here anchors `secret_tour = FALSE`, so secret tours
/// never surface through any default query path.
pub struct PgTourRepository {
    pool: Arc<PgPool>,
}

impl PgTourRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResourceRepository for PgTourRepository {
    type Entity = Tour;
    type Create = NewTour;
    type Patch = TourPatch;

    fn schema(&self) -> &'static EntitySchema {
        &TOUR_SCHEMA
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<Tour>, AppError> {
        let mut qb = QueryBuilder::new("SELECT * FROM tours WHERE secret_tour = FALSE");
        sql::push_filters(&mut qb, query);
        sql::push_order_and_page(&mut qb, query);

        let tours = qb
            .build_query_as::<Tour>()
            .fetch_all(self.pool.as_ref())
            .await?;
        Ok(tours)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Tour>, AppError> {
        let tour = sqlx::query_as::<_, Tour>(
            "SELECT * FROM tours WHERE id = $1 AND secret_tour = FALSE",
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;
        Ok(tour)
    }

    async fn create(&self, new_tour: NewTour) -> Result<Tour, AppError> {
        let tour = sqlx::query_as::<_, Tour>(
            r#"
            INSERT INTO tours (
                name, slug, duration, max_group_size, difficulty,
                price, price_discount, summary, description, image_cover,
                images, start_dates, secret_tour, start_location, locations, guides
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING *
            "#,
        )
        .bind(new_tour.name)
        .bind(new_tour.slug)
        .bind(new_tour.duration)
        .bind(new_tour.max_group_size)
        .bind(new_tour.difficulty)
        .bind(new_tour.price)
        .bind(new_tour.price_discount)
        .bind(new_tour.summary)
        .bind(new_tour.description)
        .bind(new_tour.image_cover)
        .bind(new_tour.images)
        .bind(new_tour.start_dates)
        .bind(new_tour.secret_tour)
        .bind(Json(new_tour.start_location))
        .bind(Json(new_tour.locations))
        .bind(new_tour.guides)
        .fetch_one(self.pool.as_ref())
        .await?;
        Ok(tour)
    }

    async fn update(&self, id: i64, patch: TourPatch) -> Result<Option<Tour>, AppError> {
        if patch.is_empty() {
            return self.find_by_id(id).await;
        }

        let mut qb = QueryBuilder::new("UPDATE tours SET ");
        let mut set = qb.separated(", ");

        if let Some(name) = patch.name {
            set.push("name = ");
            set.push_bind_unseparated(name);
        }
        if let Some(slug) = patch.slug {
            set.push("slug = ");
            set.push_bind_unseparated(slug);
        }
        if let Some(duration) = patch.duration {
            set.push("duration = ");
            set.push_bind_unseparated(duration);
        }
        if let Some(max_group_size) = patch.max_group_size {
            set.push("max_group_size = ");
            set.push_bind_unseparated(max_group_size);
        }
        if let Some(difficulty) = patch.difficulty {
            set.push("difficulty = ");
            set.push_bind_unseparated(difficulty);
        }
        if let Some(price) = patch.price {
            set.push("price = ");
            set.push_bind_unseparated(price);
        }
        match patch.price_discount {
            Some(Some(discount)) => {
                set.push("price_discount = ");
                set.push_bind_unseparated(discount);
            }
            Some(None) => {
                set.push("price_discount = NULL");
            }
            None => {}
        }
        if let Some(summary) = patch.summary {
            set.push("summary = ");
            set.push_bind_unseparated(summary);
        }
        match patch.description {
            Some(Some(description)) => {
                set.push("description = ");
                set.push_bind_unseparated(description);
            }
            Some(None) => {
                set.push("description = NULL");
            }
            None => {}
        }
        if let Some(image_cover) = patch.image_cover {
            set.push("image_cover = ");
            set.push_bind_unseparated(image_cover);
        }
        if let Some(images) = patch.images {
            set.push("images = ");
            set.push_bind_unseparated(images);
        }
        if let Some(start_dates) = patch.start_dates {
            set.push("start_dates = ");
            set.push_bind_unseparated(start_dates);
        }
        if let Some(secret_tour) = patch.secret_tour {
            set.push("secret_tour = ");
            set.push_bind_unseparated(secret_tour);
        }
        if let Some(start_location) = patch.start_location {
            set.push("start_location = ");
            set.push_bind_unseparated(Json(start_location));
        }
        if let Some(locations) = patch.locations {
            set.push("locations = ");
            set.push_bind_unseparated(Json(locations));
        }
        if let Some(guides) = patch.guides {
            set.push("guides = ");
            set.push_bind_unseparated(guides);
        }

        qb.push(" WHERE id = ");
        qb.push_bind(id);
        qb.push(" AND secret_tour = FALSE RETURNING *");

        let tour = qb
            .build_query_as::<Tour>()
            .fetch_optional(self.pool.as_ref())
            .await?;
        Ok(tour)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tours WHERE id = $1 AND secret_tour = FALSE")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl TourRepository for PgTourRepository {
    async fn find_detailed(&self, id: i64) -> Result<Option<TourDetail>, AppError> {
        let Some(tour) = ResourceRepository::find_by_id(self, id).await? else {
            return Ok(None);
        };

        let guides = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ANY($1)")
            .bind(&tour.guides)
            .fetch_all(self.pool.as_ref())
            .await?;

        let reviews = sqlx::query_as::<_, Review>(
            "SELECT * FROM reviews WHERE tour_id = $1 ORDER BY created_at DESC, id ASC",
        )
        .bind(id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(Some(TourDetail {
            tour,
            guides,
            reviews,
        }))
    }

    async fn stats_by_difficulty(&self) -> Result<Vec<DifficultyStats>, AppError> {
        let stats = sqlx::query_as::<_, DifficultyStats>(
            r#"
            SELECT
                difficulty,
                COUNT(*)              AS num_tours,
                SUM(ratings_quantity) AS num_ratings,
                AVG(ratings_average)  AS avg_rating,
                AVG(price)            AS avg_price,
                MIN(price)            AS min_price,
                MAX(price)            AS max_price
            FROM tours
            WHERE secret_tour = FALSE AND ratings_average >= 4.5
            GROUP BY difficulty
            ORDER BY avg_price
            "#,
        )
        .fetch_all(self.pool.as_ref())
        .await?;
        Ok(stats)
    }

    async fn monthly_plan(&self, year: i32) -> Result<Vec<MonthStarts>, AppError> {
        let from = Utc
            .with_ymd_and_hms(year, 1, 1, 0, 0, 0)
            .single()
            .ok_or_else(|| {
                AppError::cast(format!("Invalid year: {year}"), json!({ "year": year }))
            })?;
        let to = Utc
            .with_ymd_and_hms(year + 1, 1, 1, 0, 0, 0)
            .single()
            .ok_or_else(|| {
                AppError::cast(format!("Invalid year: {year}"), json!({ "year": year }))
            })?;

        let plan = sqlx::query_as::<_, MonthStarts>(
            r#"
            SELECT
                EXTRACT(MONTH FROM start_date)::int4 AS month,
                COUNT(*)                             AS num_tour_starts,
                ARRAY_AGG(name ORDER BY name)        AS tours
            FROM tours, UNNEST(start_dates) AS start_date
            WHERE secret_tour = FALSE AND start_date >= $1 AND start_date < $2
            GROUP BY month
            ORDER BY num_tour_starts DESC, month ASC
            LIMIT 6
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(self.pool.as_ref())
        .await?;
        Ok(plan)
    }

    async fn within_radius(
        &self,
        lng: f64,
        lat: f64,
        radius_radians: f64,
    ) -> Result<Vec<Tour>, AppError> {
        // Great-circle central angle between the query point and each tour's
        // start location, clamped against floating point drift.
        let tours = sqlx::query_as::<_, Tour>(
            r#"
            SELECT * FROM tours
            WHERE secret_tour = FALSE
              AND acos(LEAST(1.0, GREATEST(-1.0,
                    sin(radians($1)) * sin(radians((start_location->'coordinates'->>1)::float8))
                  + cos(radians($1)) * cos(radians((start_location->'coordinates'->>1)::float8))
                  * cos(radians((start_location->'coordinates'->>0)::float8) - radians($2))
              ))) <= $3
            ORDER BY created_at DESC, id ASC
            "#,
        )
        .bind(lat)
        .bind(lng)
        .bind(radius_radians)
        .fetch_all(self.pool.as_ref())
        .await?;
        Ok(tours)
    }

    async fn update_rating_stats(
        &self,
        tour_id: i64,
        quantity: i64,
        average: f64,
    ) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE tours SET ratings_quantity = $2::int4, ratings_average = $3 WHERE id = $1",
        )
        .bind(tour_id)
        .bind(quantity)
        .bind(average)
        .execute(self.pool.as_ref())
        .await?;
        Ok(())
    }
}
