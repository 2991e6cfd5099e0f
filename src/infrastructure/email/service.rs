//! Mailer trait and error types.

use async_trait::async_trait;

/// Errors that can occur during mail dispatch.
///
/// Callers treat any variant as "the notification did not go out"; the
/// distinction exists for logs, never for client responses.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Mail transport error: {0}")]
    Transport(String),
    #[error("Mail endpoint rejected the message with status {0}")]
    Rejected(u16),
}

/// Capability for dispatching a plain-text notification to a recipient.
///
/// # Implementations
///
/// - [`crate::infrastructure::email::HttpMailer`] - HTTP mail-API delivery
/// - [`crate::infrastructure::email::NoopMailer`] - logging no-op for
///   environments without mail configuration
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Sends a message. Dispatch is awaited; a returned error means the
    /// message was not delivered.
    async fn send(&self, to: &str, subject: &str, message: &str) -> Result<(), MailError>;
}
