//! Fetcher configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use mole_core::{Error, Result};

/// Settings shared by the robots policy and the page renderer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// User agent sent with every request and matched against robots.txt groups
    pub user_agent: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Pages whose extracted text is shorter than this are rejected as empty
    pub min_text_chars: usize,
}

impl FetchConfig {
    /// Create configuration with an explicit user agent
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_min_text_chars(mut self, min_text_chars: usize) -> Self {
        self.min_text_chars = min_text_chars;
        self
    }

    /// Product token matched against robots.txt `User-agent` lines
    pub fn agent_token(&self) -> String {
        self.user_agent
            .split(|c: char| c == '/' || c.is_whitespace())
            .next()
            .unwrap_or_default()
            .to_lowercase()
    }

    pub fn validate(&self) -> Result<()> {
        if self.agent_token().is_empty() {
            return Err(Error::Configuration("user agent must not be empty".to_string()));
        }
        if self.timeout.is_zero() {
            return Err(Error::Configuration("fetch timeout must be positive".to_string()));
        }
        Ok(())
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("mole/{}", env!("CARGO_PKG_VERSION")),
            timeout: Duration::from_secs(10),
            min_text_chars: 1,
        }
    }
}
