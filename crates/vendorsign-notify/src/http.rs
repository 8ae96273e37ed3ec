//! Plumbing shared by the HTTP providers.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode, Url};

use crate::error::NotifyError;

pub(crate) fn build_client(timeout_secs: u64) -> Result<Client, NotifyError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .user_agent("vendorsign/0.1 (agreement-delivery)")
        .build()?;
    Ok(client)
}

/// Resolves `path` below `base_url`, keeping any path prefix on the base.
pub(crate) fn endpoint(base_url: &str, path: &str) -> Result<Url, NotifyError> {
    let invalid = |reason: String| NotifyError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason,
    };
    // Exactly one trailing slash so `join` appends instead of replacing the
    // last path segment.
    let normalised = format!("{}/", base_url.trim_end_matches('/'));
    Url::parse(&normalised)
        .and_then(|base| base.join(path.trim_start_matches('/')))
        .map_err(|e| invalid(e.to_string()))
}

/// Turns a response into `Ok(())` when its status is `expected` (or any 2xx
/// when `expected` is `None`), otherwise into [`NotifyError::Rejected`].
pub(crate) async fn check_status(
    provider: &'static str,
    response: Response,
    expected: Option<StatusCode>,
) -> Result<(), NotifyError> {
    let status = response.status();
    let accepted = match expected {
        Some(code) => status == code,
        None => status.is_success(),
    };
    if accepted {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(NotifyError::Rejected {
        provider,
        status: status.as_u16(),
        body,
    })
}
