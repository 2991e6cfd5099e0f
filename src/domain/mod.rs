//! Domain layer containing business entities and logic.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures and their query schemas
//! - [`repositories`] - Data access trait definitions
//! - [`query`] - List query construction (filter/sort/project/paginate)
//! - [`rating_event`] - Rating recomputation event model
//! - [`rating_worker`] - Asynchronous rating aggregation worker
//!
//! # Design Principles
//!
//! - Domain layer has no dependencies on infrastructure or presentation
//!   layers
//! - Repository traits define contracts implemented by the infrastructure
//!   layer
//! - Business logic is encapsulated in services (see
//!   [`crate::application::services`])
//!
//! # Rating Aggregation Flow
//!
//! 1. A review is created, updated, or deleted through any mutation path
//! 2. A [`rating_event::RatingEvent`] is sent to an async channel
//! 3. [`rating_worker::run_rating_worker`] recomputes the tour's rating
//!    count/mean with retry logic and writes them back via
//!    [`repositories::TourRepository`]

pub mod entities;
pub mod query;
pub mod rating_event;
pub mod rating_worker;
pub mod repositories;
