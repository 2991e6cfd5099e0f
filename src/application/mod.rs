//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating repository
//! calls, validation, and business rules. Services consume repository traits
//! and provide a clean API for HTTP handlers.
//!
//! # Available Services
//!
//! - [`services::resource_service::ResourceService`] - Generic CRUD/list
//!   operations instantiated per entity
//! - [`services::tour_service::TourService`] - Tour management, aggregates,
//!   geo lookups
//! - [`services::review_service::ReviewService`] - Review management wired
//!   to rating aggregation
//! - [`services::user_service::UserService`] - Administrative user
//!   management
//! - [`services::auth_service::AuthService`] - Credential lifecycle and the
//!   route guard

pub mod services;
