//! Push notification delivery configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Which transport delivers push requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PushTransportKind {
    /// Write each push request to the log only.
    #[default]
    Log,
    /// POST each push request as JSON to `webhook_url`.
    Webhook,
}

/// Push delivery queue and transport settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushConfig {
    /// Whether push requests are delivered at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Transport selection.
    #[serde(default)]
    pub transport: PushTransportKind,
    /// Target URL for the webhook transport.
    #[serde(default)]
    pub webhook_url: Option<String>,
    /// Bounded queue size; requests beyond this are dropped with a warning.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Delivery attempts per request before giving up.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Base delay between attempts in milliseconds (doubled per attempt).
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_ms: u64,
    /// Per-request timeout for the webhook transport.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            transport: PushTransportKind::default(),
            webhook_url: None,
            queue_capacity: default_queue_capacity(),
            max_attempts: default_max_attempts(),
            retry_backoff_ms: default_retry_backoff(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl PushConfig {
    /// Check that the selected transport has what it needs.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.transport == PushTransportKind::Webhook
            && self.webhook_url.as_deref().is_none_or(str::is_empty)
        {
            return Err(AppError::configuration(
                "push.webhook_url is required for the webhook transport",
            ));
        }
        if self.queue_capacity == 0 || self.max_attempts == 0 {
            return Err(AppError::configuration(
                "push.queue_capacity and push.max_attempts must be at least 1",
            ));
        }
        Ok(())
    }
}

fn default_true() -> bool {
    true
}

fn default_queue_capacity() -> usize {
    1024
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_backoff() -> u64 {
    500
}

fn default_request_timeout() -> u64 {
    10
}
