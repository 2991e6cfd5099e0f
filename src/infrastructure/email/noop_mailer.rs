//! No-op mailer for environments without mail configuration.

use async_trait::async_trait;
use tracing::{debug, info};

use super::service::{MailError, Mailer};

/// A mailer that drops messages after logging them.
///
/// Used when no mail endpoint is configured, so flows that dispatch
/// notifications keep working in development without an external service.
pub struct NoopMailer;

impl NoopMailer {
    pub fn new() -> Self {
        debug!("Using NoopMailer (mail delivery disabled)");
        Self
    }
}

impl Default for NoopMailer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Mailer for NoopMailer {
    async fn send(&self, to: &str, subject: &str, message: &str) -> Result<(), MailError> {
        info!(to, subject, "Mail delivery disabled; dropping message");
        debug!(message, "Dropped mail body");
        Ok(())
    }
}
