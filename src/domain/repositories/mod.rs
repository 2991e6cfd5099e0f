//! Repository trait definitions for the domain layer.
//!
//! Traits define the contract for data operations; concrete implementations
//! live in `crate::infrastructure::persistence`. Mock implementations are
//! auto-generated via `mockall` for testing.
//!
//! # Available Repositories
//!
//! - [`ResourceRepository`] - the generic CRUD/list capability every entity
//!   implements
//! - [`TourRepository`] - tour aggregates, geo queries, rating write-back
//! - [`UserRepository`] - credential-aware user lookups and password updates
//! - [`ReviewRepository`] - review rating aggregates

pub mod resource_repository;
pub mod review_repository;
pub mod tour_repository;
pub mod user_repository;

pub use resource_repository::{DynResourceRepository, ResourceRepository};
pub use review_repository::{RatingStats, ReviewRepository};
pub use tour_repository::{DifficultyStats, MonthStarts, TourDetail, TourRepository};
pub use user_repository::UserRepository;

#[cfg(test)]
pub use review_repository::MockReviewRepository;
#[cfg(test)]
pub use tour_repository::MockTourRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
