//! Resend (`POST /emails`).

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Serialize;

use crate::error::NotifyError;
use crate::http::{build_client, check_status, endpoint};
use crate::message::EmailMessage;
use crate::EmailNotifier;

const DEFAULT_BASE_URL: &str = "https://api.resend.com";

#[derive(Serialize)]
struct ResendRequest<'a> {
    from: String,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to: Option<&'a str>,
}

pub struct ResendNotifier {
    client: Client,
    api_key: String,
    url: Url,
}

impl ResendNotifier {
    /// # Errors
    ///
    /// Returns [`NotifyError::Http`] if the HTTP client cannot be built.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, NotifyError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Points the notifier at a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] if the client cannot be built or the URL is invalid.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, NotifyError> {
        Ok(Self {
            client: build_client(timeout_secs)?,
            api_key: api_key.to_owned(),
            url: endpoint(base_url, "emails")?,
        })
    }
}

#[async_trait]
impl EmailNotifier for ResendNotifier {
    fn name(&self) -> &'static str {
        "resend"
    }

    async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError> {
        let body = ResendRequest {
            from: message.from.display(),
            to: &message.to,
            subject: &message.subject,
            html: &message.html,
            reply_to: message.reply_to.as_ref().map(|m| m.email.as_str()),
        };
        let response = self
            .client
            .post(self.url.clone())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        check_status(self.name(), response, None).await
    }
}
