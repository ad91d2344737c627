//! Assistant endpoint configuration (client-side transport).

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Configuration of the streaming assistant boundary.
#[derive(Debug, Clone, Deserialize)]
pub struct AssistantConfig {
    /// Base URL of the assistant API the client talks to.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Wall-clock timeout per streaming attempt, in seconds.
    #[serde(default = "default_attempt_timeout")]
    pub attempt_timeout_secs: u64,

    /// Pending call time-to-live, in seconds.
    #[serde(default = "default_pending_call_ttl")]
    pub pending_call_ttl_secs: i64,
}

impl AssistantConfig {
    /// Get the attempt timeout as Duration.
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_secs)
    }

    /// Validate assistant configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidAssistantUrl);
        }
        if self.attempt_timeout_secs == 0 || self.attempt_timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.pending_call_ttl_secs <= 0 {
            return Err(ValidationError::InvalidPendingCallTtl);
        }
        Ok(())
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            attempt_timeout_secs: default_attempt_timeout(),
            pending_call_ttl_secs: default_pending_call_ttl(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_attempt_timeout() -> u64 {
    30
}

fn default_pending_call_ttl() -> i64 {
    300
}
