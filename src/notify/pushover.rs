//! Pushover push-notification client.

use super::{Notifier, NotifyError};
use crate::domain::{AlertEvent, Severity};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

const DEFAULT_API_URL: &str = "https://api.pushover.net/1/messages.json";

/// Seconds an emergency alert keeps being retried.
const EXPIRE_SECS: u32 = 3600;
/// Seconds between emergency retries.
const RETRY_SECS: u32 = 600;

#[derive(Clone)]
pub struct PushoverNotifier {
    client: Client,
    api_url: String,
    token: String,
    user: String,
}

// Keep credentials out of logs.
impl std::fmt::Debug for PushoverNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PushoverNotifier")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
struct MessageForm<'a> {
    token: &'a str,
    user: &'a str,
    title: &'a str,
    message: &'a str,
    priority: i8,
    #[serde(skip_serializing_if = "Option::is_none")]
    expire: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    retry: Option<u32>,
}

impl PushoverNotifier {
    pub fn new(token: String, user: String) -> Self {
        Self::with_api_url(DEFAULT_API_URL.to_string(), token, user)
    }

    pub fn with_api_url(api_url: String, token: String, user: String) -> Self {
        Self {
            client: Client::new(),
            api_url,
            token,
            user,
        }
    }

    fn form<'a>(&'a self, alert: &'a AlertEvent) -> MessageForm<'a> {
        // Pushover only accepts expire/retry together with emergency priority.
        let emergency = alert.severity == Severity::Emergency;
        MessageForm {
            token: &self.token,
            user: &self.user,
            title: &alert.title,
            message: &alert.body,
            priority: alert.severity.priority(),
            expire: emergency.then_some(EXPIRE_SECS),
            retry: emergency.then_some(RETRY_SECS),
        }
    }
}

#[async_trait]
impl Notifier for PushoverNotifier {
    async fn send(&self, alert: &AlertEvent) -> Result<(), NotifyError> {
        debug!(kind = ?alert.kind, severity = %alert.severity, "Sending pushover notification");
        let response = self
            .client
            .post(&self.api_url)
            .form(&self.form(alert))
            .send()
            .await
            .map_err(|e| NotifyError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }
}
