use serde_json::json;

use crate::domain::repository::Mailer;
use crate::domain::types::MailMessage;
use crate::error::AuthServiceError;

/// Mailer backed by an HTTP mail relay (single JSON POST per message).
/// Any transport error or non-2xx response maps to `Delivery` — callers
/// decide whether that rolls back state or is merely logged.
#[derive(Clone)]
pub struct HttpMailer {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    from: String,
}

impl HttpMailer {
    pub fn new(api_url: String, api_key: String, from: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            api_key,
            from,
        }
    }
}

impl Mailer for HttpMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), AuthServiceError> {
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "from": self.from,
                "to": message.to,
                "subject": message.subject,
                "text": message.body,
            }))
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => Ok(()),
            Ok(resp) => {
                tracing::warn!(status = %resp.status(), to = %message.to, "mail relay rejected message");
                Err(AuthServiceError::Delivery)
            }
            Err(e) => {
                tracing::warn!(error = %e, to = %message.to, "mail relay unreachable");
                Err(AuthServiceError::Delivery)
            }
        }
    }
}
