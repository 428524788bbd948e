use super::{CardSender, TeamsMessage};
use crate::error::{AppError, Result};
use crate::metrics;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Posts Adaptive Card messages to a Teams incoming webhook
#[derive(Clone)]
pub struct TeamsSender {
    pub(crate) client: Client,
    pub(crate) webhook_url: String,
    pub(crate) timeout_secs: u64,
}

impl TeamsSender {
    /// Create a new Teams sender
    pub fn new(webhook_url: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            webhook_url: webhook_url.into(),
            timeout_secs,
        })
    }

    /// Send HTTP POST request to the webhook URL
    async fn post(&self, message: &TeamsMessage) -> Result<u16> {
        let response = self
            .client
            .post(&self.webhook_url)
            .header("Content-Type", "application/json")
            .header("User-Agent", concat!("qtest-teams-relay/", env!("CARGO_PKG_VERSION")))
            .json(message)
            .send()
            .await
            .map_err(|e| AppError::from_transport("Teams webhook", e, self.timeout_secs))?;

        let status = response.status();

        // Read response body
        let body = response.text().await.unwrap_or_default();

        // Check for success status codes (2xx)
        if !status.is_success() {
            return Err(AppError::integration(
                "teams",
                format!(
                    "Webhook returned non-success status {}: {}",
                    status,
                    if body.is_empty() { "No response body" } else { &body }
                ),
            ));
        }

        Ok(status.as_u16())
    }
}

#[async_trait]
impl CardSender for TeamsSender {
    async fn send_card(&self, message: &TeamsMessage) -> Result<u16> {
        let result = self.post(message).await;
        metrics::record_upstream("teams", result.is_ok());

        if let Ok(status_code) = &result {
            debug!(status_code = *status_code, "Teams webhook accepted card");
        }

        result
    }
}
