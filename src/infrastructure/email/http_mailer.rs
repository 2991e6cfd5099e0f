//! Mail delivery through an HTTP mail API.

use async_trait::async_trait;
use serde_json::json;

use super::service::{MailError, Mailer};

/// Sends mail by POSTing JSON to a configured HTTP mail endpoint
/// (SendGrid-style relay or an internal mail gateway).
pub struct HttpMailer {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    from: String,
}

impl HttpMailer {
    pub fn new(endpoint: String, api_key: Option<String>, from: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            api_key,
            from,
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, to: &str, subject: &str, message: &str) -> Result<(), MailError> {
        let mut request = self.client.post(&self.endpoint).json(&json!({
            "from": self.from,
            "to": to,
            "subject": subject,
            "text": message,
        }));

        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(MailError::Rejected(response.status().as_u16()));
        }

        Ok(())
    }
}
