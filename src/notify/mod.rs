//! Alert delivery.

use crate::domain::AlertEvent;
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

pub mod pushover;
pub mod recording;

pub use pushover::PushoverNotifier;
pub use recording::RecordingNotifier;

/// Delivers an alert to the user.
#[async_trait]
pub trait Notifier: Send + Sync + fmt::Debug {
    async fn send(&self, alert: &AlertEvent) -> Result<(), NotifyError>;
}

#[derive(Debug, Clone, Error)]
pub enum NotifyError {
    #[error("notification request failed: {0}")]
    Http(String),
    #[error("notification rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("notification disabled: {0}")]
    Disabled(String),
}
