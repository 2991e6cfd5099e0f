//! Business logic services for the application layer.

pub mod auth_service;
pub mod resource_service;
pub mod review_service;
pub mod tour_service;
pub mod user_service;

pub use auth_service::AuthService;
pub use resource_service::ResourceService;
pub use review_service::ReviewService;
pub use tour_service::TourService;
pub use user_service::UserService;
