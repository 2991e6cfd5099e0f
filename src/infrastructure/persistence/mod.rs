//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx. List
//! queries are composed at runtime via [`sql`] because the filter layer is
//! inherently dynamic; all values are bound parameters.
//!
//! # Repositories
//!
//! - [`PgTourRepository`] - Tour storage, aggregates, and geo queries
//! - [`PgUserRepository`] - User storage and credential lookups
//! - [`PgReviewRepository`] - Review storage and rating aggregates

pub mod pg_review_repository;
pub mod pg_tour_repository;
pub mod pg_user_repository;
pub mod sql;

pub use pg_review_repository::PgReviewRepository;
pub use pg_tour_repository::PgTourRepository;
pub use pg_user_repository::PgUserRepository;
