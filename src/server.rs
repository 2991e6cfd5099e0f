//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, migrations, worker spawning, service
//! wiring, and the Axum server lifecycle.

use anyhow::Result;
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::application::services::{AuthService, ReviewService, TourService, UserService};
use crate::config::Config;
use crate::domain::rating_worker::run_rating_worker;
use crate::error;
use crate::infrastructure::email::{HttpMailer, Mailer, NoopMailer};
use crate::infrastructure::persistence::{
    PgReviewRepository, PgTourRepository, PgUserRepository,
};
use crate::routes::app_router;
use crate::state::AppState;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Error normalization mode
/// - PostgreSQL connection pool and migrations
/// - Mailer (HTTP endpoint or NoopMailer fallback)
/// - Background rating aggregation worker
/// - Axum HTTP server
///
/// # Errors
///
/// Returns an error if the database connection, migrations, or server bind
/// fail, or on a server runtime error.
pub async fn run(config: Config) -> Result<()> {
    error::install_error_mode(config.error_mode);

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations").run(&pool).await?;

    let mailer: Arc<dyn Mailer> = match &config.mail_endpoint {
        Some(endpoint) => {
            tracing::info!("Mail enabled (HTTP endpoint)");
            Arc::new(HttpMailer::new(
                endpoint.clone(),
                config.mail_api_key.clone(),
                config.mail_from.clone(),
            ))
        }
        None => {
            tracing::info!("Mail disabled (NoopMailer)");
            Arc::new(NoopMailer::new())
        }
    };

    let pool = Arc::new(pool);
    let tour_repository = Arc::new(PgTourRepository::new(pool.clone()));
    let user_repository = Arc::new(PgUserRepository::new(pool.clone()));
    let review_repository = Arc::new(PgReviewRepository::new(pool.clone()));

    let (rating_tx, rating_rx) = mpsc::channel(config.rating_queue_capacity);
    tokio::spawn(run_rating_worker(
        rating_rx,
        review_repository.clone(),
        tour_repository.clone(),
    ));
    tracing::info!("Rating aggregation worker started");

    let auth_service = Arc::new(AuthService::new(
        user_repository.clone(),
        mailer,
        config.jwt_secret.clone(),
        config.jwt_expires_hours,
        config.public_base_url.clone(),
    ));
    let tour_service = Arc::new(TourService::new(
        tour_repository.clone(),
        tour_repository,
    ));
    let user_service = Arc::new(UserService::new(user_repository));
    let review_service = Arc::new(ReviewService::new(review_repository, rating_tx.clone()));

    let state = AppState {
        auth_service,
        tour_service,
        user_service,
        review_service,
        rating_tx,
    };

    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app)).await?;

    Ok(())
}
