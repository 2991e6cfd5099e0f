//! API route configuration.
//!
//! Public routes are open; mutating routes are wrapped in the
//! [`crate::api::middleware::auth::protect`] guard plus a role restriction,
//! composed per route.

use axum::handler::Handler;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, patch, post};
use axum::Router;

use crate::api::handlers::{
    create_review_handler, create_tour_handler, delete_review_handler, delete_tour_handler,
    delete_user_handler, forgot_password_handler, get_me_handler, get_review_handler,
    get_tour_handler, get_user_handler, list_reviews_handler, list_tours_handler,
    list_users_handler, login_handler, monthly_plan_handler, reset_password_handler,
    signup_handler, top_tours_handler, tour_stats_handler, tours_within_handler,
    update_password_handler, update_review_handler, update_tour_handler, update_user_handler,
};
use crate::api::middleware::auth::{
    protect, restrict_to_admin, restrict_to_staff, restrict_to_users,
    restrict_to_users_and_admins,
};
use crate::state::AppState;

/// Tour routes.
///
/// # Endpoints
///
/// - `GET    /`                                        - List tours (public)
/// - `POST   /`                                        - Create a tour (admin, lead-guide)
/// - `GET    /top-5-cheap`                             - Cheapest top-rated tours (public)
/// - `GET    /stats`                                   - Aggregates per difficulty (public)
/// - `GET    /busiest/{year}`                          - Busiest months of a year (public)
/// - `GET    /within/{distance}/center/{latlng}/unit/{unit}` - Geo lookup (public)
/// - `GET    /{id}`                                    - One tour, populated (public)
/// - `PATCH  /{id}`                                    - Update a tour (admin, lead-guide)
/// - `DELETE /{id}`                                    - Delete a tour (admin, lead-guide)
/// - `/{id}/reviews`                                   - Nested review routes
pub fn tour_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(list_tours_handler).post(
                create_tour_handler
                    .layer(from_fn(restrict_to_staff))
                    .layer(from_fn_with_state(state.clone(), protect)),
            ),
        )
        .route("/top-5-cheap", get(top_tours_handler))
        .route("/stats", get(tour_stats_handler))
        .route("/busiest/{year}", get(monthly_plan_handler))
        .route(
            "/within/{distance}/center/{latlng}/unit/{unit}",
            get(tours_within_handler),
        )
        .route(
            "/{id}",
            get(get_tour_handler)
                .patch(
                    update_tour_handler
                        .layer(from_fn(restrict_to_staff))
                        .layer(from_fn_with_state(state.clone(), protect)),
                )
                .delete(
                    delete_tour_handler
                        .layer(from_fn(restrict_to_staff))
                        .layer(from_fn_with_state(state.clone(), protect)),
                ),
        )
        .nest("/{id}/reviews", nested_review_routes(state))
}

/// Review routes nested under one tour; listing is scoped and creation
/// takes the tour from the path.
fn nested_review_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(list_reviews_handler)
                .post(create_review_handler.layer(from_fn(restrict_to_users))),
        )
        .route_layer(from_fn_with_state(state, protect))
}

/// Standalone review routes, all authenticated.
///
/// # Endpoints
///
/// - `GET    /`     - List all reviews
/// - `POST   /`     - Create a review (user role; tour id in the body)
/// - `GET    /{id}` - One review
/// - `PATCH  /{id}` - Update a review (user, admin)
/// - `DELETE /{id}` - Delete a review (user, admin)
pub fn review_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(list_reviews_handler)
                .post(create_review_handler.layer(from_fn(restrict_to_users))),
        )
        .route(
            "/{id}",
            get(get_review_handler)
                .patch(update_review_handler.layer(from_fn(restrict_to_users_and_admins)))
                .delete(delete_review_handler.layer(from_fn(restrict_to_users_and_admins))),
        )
        .route_layer(from_fn_with_state(state, protect))
}

/// User and auth routes.
///
/// # Endpoints
///
/// - `POST  /signup`                  - Register (public)
/// - `POST  /login`                   - Log in (public)
/// - `POST  /forgot_password`         - Request a reset token (public)
/// - `PATCH /reset_password/{token}`  - Reset via token (public)
/// - `GET   /`                        - List users (authenticated)
/// - `GET   /me`                      - Own record (authenticated)
/// - `PATCH /update_my_password`      - Change own password (authenticated)
/// - `GET/PATCH/DELETE /{id}`         - User management (admin)
pub fn user_routes(state: AppState) -> Router<AppState> {
    let admin_routes = Router::new()
        .route(
            "/{id}",
            get(get_user_handler)
                .patch(update_user_handler)
                .delete(delete_user_handler),
        )
        .route_layer(from_fn(restrict_to_admin));

    let protected_routes = Router::new()
        .route("/", get(list_users_handler))
        .route("/me", get(get_me_handler))
        .route("/update_my_password", patch(update_password_handler))
        .merge(admin_routes)
        .route_layer(from_fn_with_state(state, protect));

    Router::new()
        .route("/signup", post(signup_handler))
        .route("/login", post(login_handler))
        .route("/forgot_password", post(forgot_password_handler))
        .route("/reset_password/{token}", patch(reset_password_handler))
        .merge(protected_routes)
}
