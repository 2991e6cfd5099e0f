//! Application error taxonomy and response normalization.
//!
//! Every handler and service surfaces failures as [`AppError`]; the single
//! [`IntoResponse`] implementation here is the only place responses are
//! formatted. Raw library failures (sqlx, validator, jsonwebtoken) are
//! translated into classified variants via `From` impls before rendering.
//!
//! ## Output modes
//!
//! The renderer runs in one of two modes, installed once at startup via
//! [`install_error_mode`]:
//!
//! - **Diagnostic** - full detail for every error, including a `debug` field
//!   with the internal representation.
//! - **Restricted** - operational (classified) errors return their message;
//!   anything internal is logged server-side and collapsed into a generic
//!   500 response that leaks nothing.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use std::fmt;
use std::sync::OnceLock;

/// Error output verbosity, chosen by configuration at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorMode {
    /// Full internal detail in responses. For development only.
    Diagnostic,
    /// Operational errors only; everything else collapses to a generic 500.
    Restricted,
}

static ERROR_MODE: OnceLock<ErrorMode> = OnceLock::new();

/// Installs the error output mode. Later calls are ignored; the default
/// before installation is [`ErrorMode::Restricted`].
pub fn install_error_mode(mode: ErrorMode) {
    let _ = ERROR_MODE.set(mode);
}

fn error_mode() -> ErrorMode {
    ERROR_MODE.get().copied().unwrap_or(ErrorMode::Restricted)
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

#[derive(Debug, Serialize)]
struct ErrorInfo {
    code: &'static str,
    message: String,
    details: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    debug: Option<String>,
}

/// Classified application error.
#[derive(Debug)]
pub enum AppError {
    /// Schema or business-rule constraint violated.
    Validation { message: String, details: Value },
    /// Malformed identifier or value of the wrong type.
    Cast { message: String, details: Value },
    /// Unique constraint violated.
    Duplicate { message: String, details: Value },
    /// Missing, invalid, expired, or stale credential.
    Unauthorized { message: String, details: Value },
    /// Authenticated but not permitted.
    Forbidden { message: String, details: Value },
    /// Entity absent.
    NotFound { message: String, details: Value },
    /// Unexpected or unmapped failure.
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }
    pub fn cast(message: impl Into<String>, details: Value) -> Self {
        Self::Cast {
            message: message.into(),
            details,
        }
    }
    pub fn duplicate(message: impl Into<String>, details: Value) -> Self {
        Self::Duplicate {
            message: message.into(),
            details,
        }
    }
    pub fn unauthorized(message: impl Into<String>, details: Value) -> Self {
        Self::Unauthorized {
            message: message.into(),
            details,
        }
    }
    pub fn forbidden(message: impl Into<String>, details: Value) -> Self {
        Self::Forbidden {
            message: message.into(),
            details,
        }
    }
    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }
    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    /// Whether this is an expected, classified failure safe to describe to
    /// the client in restricted mode.
    pub fn is_operational(&self) -> bool {
        !matches!(self, Self::Internal { .. })
    }

    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Validation { .. } => (StatusCode::BAD_REQUEST, "validation_error"),
            Self::Cast { .. } => (StatusCode::BAD_REQUEST, "cast_error"),
            Self::Duplicate { .. } => (StatusCode::CONFLICT, "duplicate_field"),
            Self::Unauthorized { .. } => (StatusCode::UNAUTHORIZED, "unauthorized"),
            Self::Forbidden { .. } => (StatusCode::FORBIDDEN, "forbidden"),
            Self::NotFound { .. } => (StatusCode::NOT_FOUND, "not_found"),
            Self::Internal { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }

    fn message(&self) -> &str {
        match self {
            Self::Validation { message, .. }
            | Self::Cast { message, .. }
            | Self::Duplicate { message, .. }
            | Self::Unauthorized { message, .. }
            | Self::Forbidden { message, .. }
            | Self::NotFound { message, .. }
            | Self::Internal { message, .. } => message,
        }
    }

    fn details(&self) -> &Value {
        match self {
            Self::Validation { details, .. }
            | Self::Cast { details, .. }
            | Self::Duplicate { details, .. }
            | Self::Unauthorized { details, .. }
            | Self::Forbidden { details, .. }
            | Self::NotFound { details, .. }
            | Self::Internal { details, .. } => details,
        }
    }

    /// Normalizes the error into a response body for the given mode.
    ///
    /// The status code is the same in both modes; only the body verbosity
    /// differs.
    fn render(self, mode: ErrorMode) -> (StatusCode, ErrorBody) {
        let (status, code) = self.status_and_code();

        let info = match mode {
            ErrorMode::Diagnostic => ErrorInfo {
                code,
                message: self.message().to_string(),
                details: self.details().clone(),
                debug: Some(format!("{self:?}")),
            },
            ErrorMode::Restricted => {
                if self.is_operational() {
                    ErrorInfo {
                        code,
                        message: self.message().to_string(),
                        details: self.details().clone(),
                        debug: None,
                    }
                } else {
                    tracing::error!(error = ?self, "Unhandled internal error");
                    ErrorInfo {
                        code,
                        message: "Something went wrong".to_string(),
                        details: json!({}),
                        debug: None,
                    }
                }
            }
        };

        (status, ErrorBody { error: info })
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.render(error_mode());
        let mut response = (status, Json(body)).into_response();

        // RFC 6750: challenge header on credential failures.
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }

        response
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::RowNotFound = e {
            return Self::not_found("Resource not found", json!({}));
        }

        if let Some(db) = e.as_database_error() {
            if db.is_unique_violation() {
                return Self::duplicate(
                    "Duplicate field value",
                    json!({ "constraint": db.constraint() }),
                );
            }
            if db.is_check_violation() {
                return Self::bad_request(
                    "Invalid input data",
                    json!({ "constraint": db.constraint() }),
                );
            }
            if db.is_foreign_key_violation() {
                return Self::bad_request(
                    "Referenced resource does not exist",
                    json!({ "constraint": db.constraint() }),
                );
            }
        }

        Self::internal("Database error", json!({}))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details = serde_json::to_value(&errors).unwrap_or_else(|_| json!({}));
        Self::bad_request("Invalid input data", details)
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        let message = match e.kind() {
            ErrorKind::ExpiredSignature => "Your session has expired, please log in again",
            _ => "Invalid token, please log in again",
        };
        Self::unauthorized(message, json!({}))
    }
}
