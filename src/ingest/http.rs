/// HTTP fetch for the published index sources.
///
/// Blocking `reqwest` client. No retries and no caching happen here: a
/// transport failure or non-2xx status is returned as `IndexError::Fetch`
/// and the caller decides what to do.

use std::time::Duration;

use reqwest::blocking::Client;
use tracing::debug;

use crate::config::HttpConfig;
use crate::model::{IndexError, IndexKind};

/// Builds the shared HTTP client from config.
pub fn build_client(config: &HttpConfig) -> Result<Client, IndexError> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(|e| IndexError::Config(format!("cannot build HTTP client: {}", e)))
}

/// GETs `url` and returns the body as text.
pub fn fetch_text(client: &Client, kind: IndexKind, url: &str) -> Result<String, IndexError> {
    debug!(index = kind.name(), url, "requesting source");

    let response = client
        .get(url)
        .send()
        .map_err(|e| IndexError::fetch(kind, format!("request to {} failed: {}", url, e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(IndexError::fetch(kind, format!("HTTP {} from {}", status, url)));
    }

    response
        .text()
        .map_err(|e| IndexError::fetch(kind, format!("cannot read body from {}: {}", url, e)))
}
