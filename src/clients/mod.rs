//! Outbound HTTP providers. Each one sits behind a trait so the services can
//! be driven by fakes in tests, and each shares one `reqwest::Client` built at
//! startup with the configured timeout.

use std::time::Duration;

use thiserror::Error;

pub mod ai;
pub mod email;
pub mod payments;
pub mod whatsapp;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{0} is not configured")]
    NotConfigured(&'static str),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Rejected(String),
}

pub fn http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder().timeout(timeout).build()
}

/// Pulls `error.message` (or `error.description`) out of a provider error body.
pub(crate) fn error_message(status: reqwest::StatusCode, body: &serde_json::Value) -> String {
    body.pointer("/error/message")
        .or_else(|| body.pointer("/error/description"))
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| format!("provider returned {status}"))
}
