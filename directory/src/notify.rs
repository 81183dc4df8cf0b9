//! Notification sinks.

use std::time::Duration;

use tracing::{info, warn};

use crate::traits::NotificationSink;
use crate::NotificationEvent;

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(5);

/// Writes every event to the log. Used when no webhook is configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl NotificationSink for LogNotifier {
    fn emit(&self, event: NotificationEvent) {
        info!(proposal = %event.proposal_id(), ?event, "notification");
    }
}

/// POSTs each event as JSON to a webhook on a spawned task.
///
/// Delivery failures are logged and dropped.
#[derive(Clone)]
pub struct WebhookNotifier {
    url: String,
    http_client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(url: &str) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(WEBHOOK_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            url: url.to_string(),
            http_client,
        }
    }
}

impl NotificationSink for WebhookNotifier {
    fn emit(&self, event: NotificationEvent) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!(?event, "no async runtime, notification dropped");
            return;
        };
        let client = self.http_client.clone();
        let url = self.url.clone();
        handle.spawn(async move {
            let result = client.post(&url).json(&event).send().await;
            match result.and_then(|r| r.error_for_status()) {
                Ok(_) => info!(proposal = %event.proposal_id(), "notification delivered"),
                Err(e) => warn!(proposal = %event.proposal_id(), error = %e, "notification failed"),
            }
        });
    }
}
