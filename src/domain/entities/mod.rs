//! Core domain entities representing the business data model.
//!
//! Entities are plain data structures without business logic. Each entity
//! module also declares the [`crate::domain::query::EntitySchema`] describing
//! which columns list queries may filter and sort on.
//!
//! # Design Pattern
//!
//! Entities follow the "New Type" pattern with separate structs for creation
//! and partial update: `NewTour` / `TourPatch`, `NewUser` / `UserPatch`,
//! `NewReview` / `ReviewPatch`.

pub mod review;
pub mod tour;
pub mod user;

pub use review::{NewReview, REVIEW_SCHEMA, Review, ReviewPatch};
pub use tour::{Difficulty, GeoPoint, NewTour, TOUR_SCHEMA, Tour, TourLocation, TourPatch};
pub use user::{NewUser, Role, USER_SCHEMA, User, UserPatch};
