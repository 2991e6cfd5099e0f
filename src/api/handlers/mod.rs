//! HTTP request handlers for API endpoints.
//!
//! Each handler module corresponds to a logical grouping of endpoints.

pub mod auth;
pub mod health;
pub mod reviews;
pub mod tours;
pub mod users;

pub use auth::{
    forgot_password_handler, login_handler, reset_password_handler, signup_handler,
    update_password_handler,
};
pub use health::health_handler;
pub use reviews::{
    create_review_handler, delete_review_handler, get_review_handler, list_reviews_handler,
    update_review_handler,
};
pub use tours::{
    create_tour_handler, delete_tour_handler, get_tour_handler, list_tours_handler,
    monthly_plan_handler, top_tours_handler, tour_stats_handler, tours_within_handler,
    update_tour_handler,
};
pub use users::{
    delete_user_handler, get_me_handler, get_user_handler, list_users_handler,
    update_user_handler,
};
