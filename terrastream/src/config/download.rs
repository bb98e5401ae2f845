//! HTTP transport configuration.

use std::time::Duration;

use super::defaults::{DEFAULT_ACCEPT_LANGUAGE, DEFAULT_DOWNLOAD_TIMEOUT_SECS, DEFAULT_USER_AGENT};

/// Settings for the HTTP fetch transport.
///
/// ```
/// use terrastream::config::DownloadConfig;
///
/// let config = DownloadConfig::default();
/// assert_eq!(config.timeout_secs(), 30);
/// assert_eq!(config.accept_language(), "en-US,en");
///
/// let config = DownloadConfig::new()
///     .with_timeout_secs(5)
///     .with_accept_language("fr-FR");
/// assert_eq!(config.timeout().as_secs(), 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadConfig {
    timeout_secs: u64,
    accept_language: String,
    user_agent: String,
}

impl DownloadConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Per-request timeout. Timeouts surface as fetch failures.
    pub fn with_timeout_secs(mut self, timeout: u64) -> Self {
        self.timeout_secs = timeout;
        self
    }

    pub fn with_accept_language(mut self, value: impl Into<String>) -> Self {
        self.accept_language = value.into();
        self
    }

    pub fn with_user_agent(mut self, value: impl Into<String>) -> Self {
        self.user_agent = value.into();
        self
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn accept_language(&self) -> &str {
        &self.accept_language
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_DOWNLOAD_TIMEOUT_SECS,
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}
