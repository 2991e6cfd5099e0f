//! PostgreSQL implementation of user repositories.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, QueryBuilder};
use std::sync::Arc;

use crate::domain::entities::{NewUser, USER_SCHEMA, User, UserPatch};
use crate::domain::query::{EntitySchema, ListQuery};
use crate::domain::repositories::{ResourceRepository, UserRepository};
use crate::error::AppError;
use crate::infrastructure::persistence::sql;

/// PostgreSQL repository for user storage and credential lookups.
pub struct PgUserRepository {
    pool: Arc<PgPool>,
}

impl PgUserRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResourceRepository for PgUserRepository {
    type Entity = User;
    type Create = NewUser;
    type Patch = UserPatch;

    fn schema(&self) -> &'static EntitySchema {
        &USER_SCHEMA
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<User>, AppError> {
        let mut qb = QueryBuilder::new("SELECT * FROM users WHERE TRUE");
        sql::push_filters(&mut qb, query);
        sql::push_order_and_page(&mut qb, query);

        let users = qb
            .build_query_as::<User>()
            .fetch_all(self.pool.as_ref())
            .await?;
        Ok(users)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        UserRepository::find_by_id(self, id).await
    }

    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        UserRepository::create(self, user).await
    }

    async fn update(&self, id: i64, patch: UserPatch) -> Result<Option<User>, AppError> {
        if patch.is_empty() {
            return UserRepository::find_by_id(self, id).await;
        }

        let mut qb = QueryBuilder::new("UPDATE users SET ");
        let mut set = qb.separated(", ");

        if let Some(name) = patch.name {
            set.push("name = ");
            set.push_bind_unseparated(name);
        }
        if let Some(email) = patch.email {
            set.push("email = ");
            set.push_bind_unseparated(email.to_lowercase());
        }
        match patch.photo {
            Some(Some(photo)) => {
                set.push("photo = ");
                set.push_bind_unseparated(photo);
            }
            Some(None) => {
                set.push("photo = NULL");
            }
            None => {}
        }
        if let Some(role) = patch.role {
            set.push("role = ");
            set.push_bind_unseparated(role);
        }

        qb.push(" WHERE id = ");
        qb.push_bind(id);
        qb.push(" RETURNING *");

        let user = qb
            .build_query_as::<User>()
            .fetch_optional(self.pool.as_ref())
            .await?;
        Ok(user)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, photo, role, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(user.name)
        .bind(user.email.to_lowercase())
        .bind(user.photo)
        .bind(user.role)
        .bind(user.password_hash)
        .fetch_one(self.pool.as_ref())
        .await?;
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email.to_lowercase())
            .fetch_optional(self.pool.as_ref())
            .await?;
        Ok(user)
    }

    async fn find_by_reset_token(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM users
            WHERE password_reset_token = $1 AND password_reset_expires > $2
            "#,
        )
        .bind(token_hash)
        .bind(now)
        .fetch_optional(self.pool.as_ref())
        .await?;
        Ok(user)
    }

    async fn update_password(
        &self,
        user_id: i64,
        password_hash: &str,
        changed_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET password_hash = $2, password_changed_at = $3 WHERE id = $1")
            .bind(user_id)
            .bind(password_hash)
            .bind(changed_at)
            .execute(self.pool.as_ref())
            .await?;
        Ok(())
    }

    async fn set_reset_token(
        &self,
        user_id: i64,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE users
            SET password_reset_token = $2, password_reset_expires = $3
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .execute(self.pool.as_ref())
        .await?;
        Ok(())
    }

    async fn clear_reset_token(&self, user_id: i64) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE users
            SET password_reset_token = NULL, password_reset_expires = NULL
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .execute(self.pool.as_ref())
        .await?;
        Ok(())
    }

    async fn reset_password(
        &self,
        user_id: i64,
        password_hash: &str,
        changed_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        // Token consumption and password write happen in one statement so a
        // reset token can never be replayed.
        sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2,
                password_changed_at = $3,
                password_reset_token = NULL,
                password_reset_expires = NULL
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(password_hash)
        .bind(changed_at)
        .execute(self.pool.as_ref())
        .await?;
        Ok(())
    }
}
