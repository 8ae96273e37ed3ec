use vendorsign_core::app_config::MailConfig;

use crate::error::NotifyError;
use crate::forge::ForgeNotifier;
use crate::log::LogNotifier;
use crate::message::EmailMessage;
use crate::resend::ResendNotifier;
use crate::sendgrid::SendGridNotifier;
use crate::EmailNotifier;

/// One provider that failed during [`NotifierChain::send`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderFailure {
    pub provider: &'static str,
    pub error: String,
}

/// Result of trying the chain: which provider delivered, if any, and every
/// failure seen before that.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryOutcome {
    pub provider: Option<&'static str>,
    pub failures: Vec<ProviderFailure>,
}

impl DeliveryOutcome {
    #[must_use]
    pub fn delivered(&self) -> bool {
        self.provider.is_some()
    }
}

/// Ordered list of notifiers; the first success wins.
pub struct NotifierChain {
    notifiers: Vec<Box<dyn EmailNotifier>>,
}

impl NotifierChain {
    #[must_use]
    pub fn new(notifiers: Vec<Box<dyn EmailNotifier>>) -> Self {
        Self { notifiers }
    }

    /// Chain of the credentialed providers in the order Resend, SendGrid,
    /// Forge, always terminated by [`LogNotifier`].
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] if a provider's HTTP client or URL is invalid.
    pub fn from_config(config: &MailConfig) -> Result<Self, NotifyError> {
        let mut notifiers: Vec<Box<dyn EmailNotifier>> = Vec::new();

        if let Some(key) = &config.resend_api_key {
            notifiers.push(Box::new(ResendNotifier::new(key, config.timeout_secs)?));
        }
        if let Some(key) = &config.sendgrid_api_key {
            notifiers.push(Box::new(SendGridNotifier::new(
                key,
                config.sendgrid_from_email.clone(),
                config.timeout_secs,
            )?));
        }
        if let (Some(url), Some(key)) = (&config.forge_api_url, &config.forge_api_key) {
            notifiers.push(Box::new(ForgeNotifier::new(url, key, config.timeout_secs)?));
        }
        notifiers.push(Box::new(LogNotifier));

        Ok(Self::new(notifiers))
    }

    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.notifiers.iter().map(|n| n.name()).collect()
    }

    /// Tries each notifier in order until one succeeds.
    pub async fn send(&self, message: &EmailMessage) -> DeliveryOutcome {
        let mut outcome = DeliveryOutcome::default();
        for notifier in &self.notifiers {
            match notifier.send(message).await {
                Ok(()) => {
                    tracing::info!(provider = notifier.name(), to = %message.to, "e-mail sent");
                    outcome.provider = Some(notifier.name());
                    return outcome;
                }
                Err(e) => {
                    tracing::warn!(
                        provider = notifier.name(),
                        to = %message.to,
                        error = %e,
                        "e-mail provider failed; trying next"
                    );
                    outcome.failures.push(ProviderFailure {
                        provider: notifier.name(),
                        error: e.to_string(),
                    });
                }
            }
        }
        tracing::error!(to = %message.to, "every e-mail provider failed");
        outcome
    }
}
