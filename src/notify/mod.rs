//! Push notifications for run outcomes.
//!
//! Posts a short success/failure message to the Prowl public API after
//! the workflow reaches an outcome. Notification delivery is strictly
//! best effort: a failed post is logged at warn level and never affects
//! the run's result. Notifications are disabled when no API key is
//! configured.

use crate::config::Config;
use crate::constants::{APP_NAME, NOTIFY_URL_ENV_VAR, PROWL_ADD_URL, USER_AGENT};
use crate::core::UpdaterError;
use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Client for the Prowl push-notification API.
pub struct ProwlNotifier {
    client: reqwest::Client,
    api_key: String,
    priority: i8,
    endpoint: String,
}

impl ProwlNotifier {
    /// Build a notifier from the run configuration.
    ///
    /// Returns `None` when notifications are disabled (no API key), so
    /// callers can skip the step without carrying a flag around.
    pub fn new(config: &Config) -> Result<Option<Self>> {
        if !config.notify.is_enabled() {
            debug!("Notifications disabled: no API key configured");
            return Ok(None);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.default.timeout))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client for notifications")?;

        let endpoint = std::env::var(NOTIFY_URL_ENV_VAR)
            .unwrap_or_else(|_| PROWL_ADD_URL.to_string());

        Ok(Some(Self {
            client,
            api_key: config.notify.api_key.clone(),
            priority: config.notify.priority,
            endpoint,
        }))
    }

    /// Override the API endpoint. Used by tests to point at a fixture.
    #[doc(hidden)]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Post one notification.
    ///
    /// `event` names the server the message is about; `description`
    /// carries the outcome text.
    pub async fn send(&self, event: &str, description: &str) -> Result<(), UpdaterError> {
        let priority = self.priority.to_string();
        let params = [
            ("apikey", self.api_key.as_str()),
            ("application", APP_NAME),
            ("event", event),
            ("description", description),
            ("priority", priority.as_str()),
        ];

        let response = self
            .client
            .post(&self.endpoint)
            .form(&params)
            .send()
            .await
            .map_err(|e| UpdaterError::NotificationFailed {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpdaterError::NotificationFailed {
                reason: format!("HTTP {status}"),
            });
        }

        info!("Notification sent: {description}");
        Ok(())
    }

    /// Post one notification, swallowing failures.
    ///
    /// This is what the workflow calls: a lost notification is worth a
    /// warning, not a failed run.
    pub async fn send_best_effort(&self, event: &str, description: &str) {
        if let Err(e) = self.send(event, description).await {
            warn!("{e}");
        }
    }
}
