//! Notifier that records alerts instead of sending them.

use super::{Notifier, NotifyError};
use crate::domain::AlertEvent;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<AlertEvent>>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record nothing and fail every send.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Alerts delivered so far, in order.
    pub fn sent(&self) -> Vec<AlertEvent> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, alert: &AlertEvent) -> Result<(), NotifyError> {
        if self.fail {
            return Err(NotifyError::Disabled("recording notifier set to fail".to_string()));
        }
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(alert.clone());
        Ok(())
    }
}
