//! Forge notification API (`POST <base>/api/notification/email`).

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Serialize;

use crate::error::NotifyError;
use crate::http::{build_client, check_status, endpoint};
use crate::message::EmailMessage;
use crate::EmailNotifier;

const ATTACHMENT_NAME: &str = "agreement.html";

#[derive(Serialize)]
struct ForgeRequest<'a> {
    to: &'a str,
    subject: &'a str,
    html: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    attachments: Option<Vec<ForgeAttachment<'a>>>,
}

#[derive(Serialize)]
struct ForgeAttachment<'a> {
    filename: &'a str,
    path: &'a str,
}

pub struct ForgeNotifier {
    client: Client,
    api_key: String,
    url: Url,
}

impl ForgeNotifier {
    /// # Errors
    ///
    /// Returns [`NotifyError`] if the client cannot be built or `base_url` is invalid.
    pub fn new(base_url: &str, api_key: &str, timeout_secs: u64) -> Result<Self, NotifyError> {
        Ok(Self {
            client: build_client(timeout_secs)?,
            api_key: api_key.to_owned(),
            url: endpoint(base_url, "api/notification/email")?,
        })
    }
}

#[async_trait]
impl EmailNotifier for ForgeNotifier {
    fn name(&self) -> &'static str {
        "forge"
    }

    async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError> {
        let body = ForgeRequest {
            to: &message.to,
            subject: &message.subject,
            html: &message.html,
            attachments: message.attachment_url.as_deref().map(|path| {
                vec![ForgeAttachment {
                    filename: ATTACHMENT_NAME,
                    path,
                }]
            }),
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
