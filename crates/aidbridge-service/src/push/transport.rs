//! Push transport implementations.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use aidbridge_core::config::{PushConfig, PushTransportKind};
use aidbridge_core::error::{AppError, ErrorKind};
use aidbridge_core::result::AppResult;
use aidbridge_core::traits::{PushPayload, PushTransport};

/// Writes each push to the log. Used in development and when no external
/// notification service is configured.
#[derive(Debug, Default, Clone)]
pub struct LogTransport;

#[async_trait]
impl PushTransport for LogTransport {
    async fn deliver(&self, payload: &PushPayload) -> AppResult<()> {
        info!(
            responder_id = %payload.responder_id,
            need_id = %payload.need_id,
            ticket_id = %payload.ticket_id,
            emergency = payload.emergency,
            title = %payload.title,
            "Push notification"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

/// POSTs each push as JSON to a webhook of the external notification service.
#[derive(Debug, Clone)]
pub struct WebhookTransport {
    client: reqwest::Client,
    url: String,
}

impl WebhookTransport {
    /// Create a webhook transport with a per-request timeout.
    pub fn new(url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    format!("Failed to build push HTTP client: {e}"),
                    e,
                )
            })?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl PushTransport for WebhookTransport {
    async fn deliver(&self, payload: &PushPayload) -> AppResult<()> {
        let response = self
            .client
            .post(&self.url)
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::ExternalService,
                    format!("Push webhook request failed: {e}"),
                    e,
                )
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(AppError::external(format!(
            "Push webhook returned {status}: {body}"
        )))
    }

    fn name(&self) -> &'static str {
        "webhook"
    }
}

/// Build the transport selected by configuration.
pub fn build_transport(config: &PushConfig) -> AppResult<Arc<dyn PushTransport>> {
    match config.transport {
        PushTransportKind::Log => Ok(Arc::new(LogTransport)),
        PushTransportKind::Webhook => {
            let url = config.webhook_url.as_deref().ok_or_else(|| {
                AppError::configuration("push.webhook_url is required for the webhook transport")
            })?;
            Ok(Arc::new(WebhookTransport::new(
                url,
                Duration::from_secs(config.request_timeout_seconds),
            )?))
        }
    }
}
