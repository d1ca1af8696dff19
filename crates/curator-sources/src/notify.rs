use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tracing::{info, warn};
use crate::error::SourceError;
use crate::traits::Notifier;

/// Writes notifications to the log only
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, title: &str, body: &str) {
        info!(operation = "notify", title = %title, "{}", body);
    }
}

/// POSTs `{"title", "text"}` to a webhook
#[derive(Clone)]
pub struct WebhookNotifier {
    client: Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: String) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, title: &str, body: &str) {
        let payload = json!({ "title": title, "text": body });
        match self.client.post(&self.url).json(&payload).send().await {
            Ok(response) if response.status().is_success() => {
                info!(operation = "notify", title = %title, "Notification delivered");
            }
            Ok(response) => {
                warn!(
                    operation = "notify",
                    title = %title,
                    status = response.status().as_u16(),
                    "Webhook rejected notification"
                );
            }
            Err(e) => {
                warn!(operation = "notify", title = %title, error = %e, "Failed to deliver notification");
            }
        }
    }
}
