//! Outbound mail abstractions (HTTP mail API and no-op implementations).

pub mod http_mailer;
pub mod noop_mailer;
pub mod service;

pub use http_mailer::HttpMailer;
pub use noop_mailer::NoopMailer;
pub use service::{MailError, Mailer};

#[cfg(test)]
pub use service::MockMailer;
