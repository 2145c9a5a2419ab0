//! Connection settings for one Grist document.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

/// Where and how to reach a Grist document. Immutable once built.
#[derive(Debug)]
pub struct ClientConfig {
    root_url: String,
    api_key: SecretString,
    doc_id: String,
    timeout: Option<Duration>,
}

impl ClientConfig {
    /// `root_url` is the server root (e.g. `https://docs.getgrist.com`),
    /// without the `/api` suffix.
    pub fn new(root_url: &str, api_key: impl Into<String>, doc_id: &str) -> Self {
        let api_key: String = api_key.into();
        Self {
            root_url: root_url.trim_end_matches('/').to_string(),
            api_key: SecretString::new(api_key.into_boxed_str()),
            doc_id: doc_id.to_string(),
            timeout: None,
        }
    }

    /// Bound every request made with this config to `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn root_url(&self) -> &str {
        &self.root_url
    }

    pub fn doc_id(&self) -> &str {
        &self.doc_id
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub(crate) fn bearer(&self) -> String {
        format!("Bearer {}", self.api_key.expose_secret())
    }

    /// `{root_url}/api{path}`
    pub(crate) fn api_url(&self, path: &str) -> String {
        format!("{}/api{path}", self.root_url)
    }
}
