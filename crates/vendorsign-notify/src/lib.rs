//! E-mail delivery for signed agreements.
//!
//! Each provider implements [`EmailNotifier`]; [`NotifierChain`] tries them
//! in order and stops at the first success.

mod chain;
pub mod error;
mod forge;
mod http;
mod log;
mod message;
mod resend;
mod sendgrid;

use async_trait::async_trait;

pub use chain::{DeliveryOutcome, NotifierChain, ProviderFailure};
pub use error::NotifyError;
pub use forge::ForgeNotifier;
pub use log::LogNotifier;
pub use message::{EmailMessage, Mailbox};
pub use resend::ResendNotifier;
pub use sendgrid::SendGridNotifier;

/// A way of delivering an [`EmailMessage`].
#[async_trait]
pub trait EmailNotifier: Send + Sync {
    /// Short provider name used in logs and delivery reports.
    fn name(&self) -> &'static str;

    /// # Errors
    ///
    /// Returns [`NotifyError`] if the provider could not accept the message.
    async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError>;
}
