//! Session token signing and verification.
//!
//! Session tokens are HS256 JWTs carrying the user id, issue time, and
//! expiry. Verification rejects both bad signatures and expired tokens.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::AppError;

/// Claims carried by a session token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: i64,
    /// Issue time (unix seconds). Compared against `password_changed_at` to
    /// invalidate tokens issued before a password change.
    pub iat: i64,
    /// Expiry (unix seconds).
    pub exp: i64,
}

/// Signs a session token for a user.
///
/// # Errors
///
/// Returns [`AppError::Internal`] if encoding fails.
pub fn sign_token(user_id: i64, secret: &str, expires_hours: i64) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id,
        iat: now.timestamp(),
        exp: (now + Duration::hours(expires_hours)).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::internal("Failed to sign session token", json!({ "reason": e.to_string() })))
}

/// Verifies a session token and returns its claims.
///
/// # Errors
///
/// Returns [`AppError::Unauthorized`] with a client-appropriate message for
/// both expired and otherwise invalid tokens.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
    .map_err(AppError::from)
}
