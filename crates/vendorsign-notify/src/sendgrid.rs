//! SendGrid v3 (`POST /v3/mail/send`). Only `202 Accepted` counts as sent.

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde_json::json;

use crate::error::NotifyError;
use crate::http::{build_client, check_status, endpoint};
use crate::message::EmailMessage;
use crate::EmailNotifier;

const DEFAULT_BASE_URL: &str = "https://api.sendgrid.com";

pub struct SendGridNotifier {
    client: Client,
    api_key: String,
    /// Verified sender that replaces the message's `from` address.
    from_override: Option<String>,
    url: Url,
}

impl SendGridNotifier {
    /// # Errors
    ///
    /// Returns [`NotifyError::Http`] if the HTTP client cannot be built.
    pub fn new(
        api_key: &str,
        from_override: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self, NotifyError> {
        Self::with_base_url(api_key, from_override, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Points the notifier at a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] if the client cannot be built or the URL is invalid.
    pub fn with_base_url(
        api_key: &str,
        from_override: Option<String>,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, NotifyError> {
        Ok(Self {
            client: build_client(timeout_secs)?,
            api_key: api_key.to_owned(),
            from_override,
            url: endpoint(base_url, "v3/mail/send")?,
        })
    }

    fn payload(&self, message: &EmailMessage) -> serde_json::Value {
        let from_email = self
            .from_override
            .as_deref()
            .unwrap_or(&message.from.email);
        let mut payload = json!({
            "personalizations": [{
                "to": [{ "email": message.to }],
                "subject": message.subject,
            }],
            "from": { "email": from_email, "name": message.from.name },
            "content": [{ "type": "text/html", "value": message.html }],
        });
        if let Some(reply_to) = &message.reply_to {
            payload["reply_to"] = json!({ "email": reply_to.email, "name": reply_to.name });
        }
        payload
    }
}

#[async_trait]
impl EmailNotifier for SendGridNotifier {
    fn name(&self) -> &'static str {
        "sendgrid"
    }

    async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(self.url.clone())
            .bearer_auth(&self.api_key)
            .json(&self.payload(message))
            .send()
            .await?;
        check_status(self.name(), response, Some(StatusCode::ACCEPTED)).await
    }
}
