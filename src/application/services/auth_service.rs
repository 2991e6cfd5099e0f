//! Authentication and credential lifecycle service.

use chrono::{Duration, Utc};
use serde_json::json;
use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::domain::entities::{NewUser, Role, User};
use crate::domain::repositories::UserRepository;
use crate::error::AppError;
use crate::infrastructure::email::Mailer;
use crate::utils::jwt;
use crate::utils::password::{hash_password, verify_password};

/// A reset token dies 10 minutes after issuance.
const RESET_TOKEN_TTL_MINUTES: i64 = 10;

/// Service backing signup, login, the route guard, and the password
/// lifecycle (forgot/reset/update).
///
/// Session tokens are HS256 JWTs; reset tokens are random values stored only
/// as SHA-256 hashes, so a database leak exposes neither.
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    mailer: Arc<dyn Mailer>,
    jwt_secret: String,
    jwt_expires_hours: i64,
    public_base_url: String,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        mailer: Arc<dyn Mailer>,
        jwt_secret: String,
        jwt_expires_hours: i64,
        public_base_url: String,
    ) -> Self {
        Self {
            users,
            mailer,
            jwt_secret,
            jwt_expires_hours,
            public_base_url,
        }
    }

    /// Registers a new user and issues a session token.
    ///
    /// The password/password_confirm equality is enforced at the DTO layer;
    /// only the confirmed password reaches this point and only its hash is
    /// persisted.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Duplicate`] when the email is already registered.
    pub async fn signup(
        &self,
        name: String,
        email: String,
        password: &str,
        role: Option<Role>,
    ) -> Result<(User, String), AppError> {
        let user = self
            .users
            .create(NewUser {
                name,
                email: email.to_lowercase(),
                photo: None,
                role: role.unwrap_or_default(),
                password_hash: hash_password(password),
            })
            .await?;

        let token = self.sign_session_token(user.id)?;
        Ok((user, token))
    }

    /// Verifies credentials and issues a session token.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] with one indistinguishable message
    /// for both an unknown email and a wrong password.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, AppError> {
        let Some(user) = self.users.find_by_email(&email.to_lowercase()).await? else {
            return Err(Self::bad_credentials());
        };
        if !verify_password(password, &user.password_hash) {
            return Err(Self::bad_credentials());
        }

        self.sign_session_token(user.id)
    }

    /// Resolves a bearer token to its user; the core of the route guard.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] when the token is invalid or
    /// expired, the referenced user no longer exists, or the password was
    /// changed after the token was issued.
    pub async fn authenticate(&self, token: &str) -> Result<User, AppError> {
        let claims = jwt::verify_token(token, &self.jwt_secret)?;

        let user = self.users.find_by_id(claims.sub).await?.ok_or_else(|| {
            AppError::unauthorized("The user belonging to this token no longer exists", json!({}))
        })?;

        if user.changed_password_after(claims.iat) {
            return Err(AppError::unauthorized(
                "Password was changed after this token was issued, please log in again",
                json!({}),
            ));
        }

        Ok(user)
    }

    /// Issues a reset token for a user and dispatches it by mail.
    ///
    /// Only the token's SHA-256 hash is stored. If dispatch fails the stored
    /// token is cleared again — a live reset token the legitimate user never
    /// received would otherwise be unrecoverable — and the mail failure is
    /// not described to the client.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] when no user has this email
    /// - [`AppError::Internal`] when mail dispatch fails
    pub async fn forgot_password(&self, email: &str) -> Result<(), AppError> {
        let user = self
            .users
            .find_by_email(&email.to_lowercase())
            .await?
            .ok_or_else(|| {
                AppError::not_found("No user found with that email address", json!({}))
            })?;

        let token = generate_reset_token();
        let token_hash = hash_reset_token(&token);
        let expires_at = Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES);
        self.users
            .set_reset_token(user.id, &token_hash, expires_at)
            .await?;

        let reset_url = format!(
            "{}/api/v1/users/reset_password/{}",
            self.public_base_url.trim_end_matches('/'),
            token
        );
        let message = format!(
            "Forgot your password? Submit a PATCH request with your new password and \
             password_confirm to: {reset_url}\n\
             If you didn't forget your password, please ignore this message."
        );

        if let Err(e) = self
            .mailer
            .send(
                &user.email,
                "Your password reset token (valid for 10 minutes)",
                &message,
            )
            .await
        {
            tracing::error!(error = %e, user_id = user.id, "Failed to dispatch password reset mail");
            self.users.clear_reset_token(user.id).await?;
            return Err(AppError::internal(
                "There was an error sending the email, try again later",
                json!({}),
            ));
        }

        Ok(())
    }

    /// Consumes a reset token, sets the new password, and issues a fresh
    /// session token.
    ///
    /// The repository clears the stored token in the same statement that
    /// writes the password, so the token is accepted exactly once.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] when the token matches no user or
    /// has expired.
    pub async fn reset_password(&self, token: &str, password: &str) -> Result<String, AppError> {
        let token_hash = hash_reset_token(token);
        let user = self
            .users
            .find_by_reset_token(&token_hash, Utc::now())
            .await?
            .ok_or_else(|| AppError::bad_request("Token is invalid or has expired", json!({})))?;

        self.users
            .reset_password(user.id, &hash_password(password), password_change_stamp())
            .await?;

        self.sign_session_token(user.id)
    }

    /// Changes the password of an already-authenticated user.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] when the supplied current password
    /// does not verify.
    pub async fn update_password(
        &self,
        user: &User,
        current_password: &str,
        new_password: &str,
    ) -> Result<String, AppError> {
        if !verify_password(current_password, &user.password_hash) {
            return Err(AppError::unauthorized(
                "Your current password is incorrect",
                json!({}),
            ));
        }

        self.users
            .update_password(user.id, &hash_password(new_password), password_change_stamp())
            .await?;

        self.sign_session_token(user.id)
    }

    fn sign_session_token(&self, user_id: i64) -> Result<String, AppError> {
        jwt::sign_token(user_id, &self.jwt_secret, self.jwt_expires_hours)
    }

    fn bad_credentials() -> AppError {
        AppError::unauthorized("Incorrect email or password", json!({}))
    }
}

/// `password_changed_at` stamp, backdated one second so the session token
/// issued by the same request does not predate the change.
fn password_change_stamp() -> chrono::DateTime<Utc> {
    Utc::now() - Duration::seconds(1)
}

/// 32 random bytes, hex-encoded. The plaintext goes to the user; only the
/// hash is stored.
///
/// # Panics
///
/// Panics if the system random number generator fails (extremely rare).
fn generate_reset_token() -> String {
    let mut bytes = [0u8; 32];
    getrandom::fill(&mut bytes).expect("Failed to generate random bytes");
    hex::encode(bytes)
}

/// One-way hash under which reset tokens are stored and looked up.
pub fn hash_reset_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
