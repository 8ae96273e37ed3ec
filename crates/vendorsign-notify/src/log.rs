use async_trait::async_trait;

use crate::error::NotifyError;
use crate::message::EmailMessage;
use crate::EmailNotifier;

/// Writes the envelope to the log instead of sending. Always succeeds.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl EmailNotifier for LogNotifier {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError> {
        tracing::info!(
            to = %message.to,
            from = %message.from.email,
            subject = %message.subject,
            html_len = message.html.len(),
            "no e-mail provider configured; message logged instead of sent"
        );
        Ok(())
    }
}
