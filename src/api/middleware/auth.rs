//! Route guards: bearer-token authentication and role restriction.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_auth::AuthBearer;
use serde_json::json;

use crate::domain::entities::{Role, User};
use crate::error::AppError;
use crate::state::AppState;

/// The authenticated user attached to the request by [`protect`].
///
/// Handlers take this as an extractor; it fails with 401 when used on a
/// route that was not wired through the guard.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, AppError> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(not_logged_in)
    }
}

/// Authenticates requests using Bearer tokens from the Authorization header.
///
/// # Authentication Flow
///
/// 1. Extract token from the `Authorization` header (401 if absent)
/// 2. Verify token signature and expiry (401 on either failure)
/// 3. Re-load the referenced user (401 if it no longer exists)
/// 4. Reject tokens issued before the user's last password change (401)
/// 5. Attach the resolved user to the request and continue
///
/// 401 responses carry a `WWW-Authenticate: Bearer` header per RFC 6750.
pub async fn protect(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let AuthBearer(token) = AuthBearer::from_request_parts(&mut parts, &())
        .await
        .map_err(|_| not_logged_in())?;

    let user = state.auth_service.authenticate(&token).await?;

    let mut req = Request::from_parts(parts, body);
    req.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(req).await)
}

/// Admin or lead guide: tour management.
pub async fn restrict_to_staff(req: Request, next: Next) -> Result<Response, AppError> {
    restrict_to(&[Role::Admin, Role::LeadGuide], req, next).await
}

/// Admin only: user management.
pub async fn restrict_to_admin(req: Request, next: Next) -> Result<Response, AppError> {
    restrict_to(&[Role::Admin], req, next).await
}

/// Regular users only: authoring reviews.
pub async fn restrict_to_users(req: Request, next: Next) -> Result<Response, AppError> {
    restrict_to(&[Role::User], req, next).await
}

/// Regular users and admins: editing or removing reviews.
pub async fn restrict_to_users_and_admins(req: Request, next: Next) -> Result<Response, AppError> {
    restrict_to(&[Role::User, Role::Admin], req, next).await
}

/// Fails with 403 unless the user attached by [`protect`] holds one of the
/// allowed roles. Must be layered inside the guard.
async fn restrict_to(allowed: &[Role], req: Request, next: Next) -> Result<Response, AppError> {
    let role = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or_else(not_logged_in)?
        .0
        .role;

    if !allowed.contains(&role) {
        return Err(AppError::forbidden(
            "You do not have permission to perform this action",
            json!({ "role": role }),
        ));
    }

    Ok(next.run(req).await)
}

fn not_logged_in() -> AppError {
    AppError::unauthorized(
        "You are not logged in, please log in to get access",
        json!({}),
    )
}
