//! Shared HTTP client and its immutable configuration

use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;

use crate::constants::{ACCOUNT_API_BASE, CLIENT_USER_AGENT, DEFAULT_TIMEOUT};
use crate::error::{Error, Result};

/// Connection settings shared by the list and mine calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Account service base, e.g. `https://account.neos.com/v1`
    pub base_url: String,
    /// Upper bound on each request, connect through body read
    pub timeout: Duration,
    /// Identifying header value attached to mine requests
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: ACCOUNT_API_BASE.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: CLIENT_USER_AGENT.to_string(),
        }
    }
}

/// Client for the account service meteor endpoints.
///
/// Cheap to clone: the underlying `reqwest::Client` pools connections
/// internally and the configuration is behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Client {
    pub(crate) http: reqwest::Client,
    pub(crate) config: Arc<ClientConfig>,
}

impl Client {
    /// Build a client. The timeout applies to every call made through it.
    pub fn new(config: ClientConfig) -> Result<Self> {
        // Validate the base once so per-call URL building can only fail on
        // segment encoding, which it never does.
        endpoint(&config.base_url, &[])?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            config: Arc::new(config),
        })
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

/// Append percent-encoded path segments to `base`.
///
/// Each segment is escaped individually, so a user id containing `/` or
/// spaces stays a single path segment.
pub(crate) fn endpoint(base: &str, segments: &[&str]) -> Result<Url> {
    let mut url =
        Url::parse(base).map_err(|e| Error::Config(format!("invalid base URL {base}: {e}")))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(Error::Config(format!(
            "base URL must use http or https, got: {base}"
        )));
    }
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|()| Error::Config(format!("base URL cannot have a path: {base}")))?;
        path.pop_if_empty();
        for segment in segments {
            path.push(segment);
        }
    }
    Ok(url)
}
