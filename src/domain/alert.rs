//! Alert events and their delivery priority.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Delivery priority, using the push service's numeric levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Lowest = -2,
    Low = -1,
    Normal = 0,
    High = 1,
    Emergency = 2,
}

impl Severity {
    /// Numeric priority sent to the push service.
    pub fn priority(&self) -> i8 {
        *self as i8
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Lowest => "lowest",
            Severity::Low => "low",
            Severity::Normal => "normal",
            Severity::High => "high",
            Severity::Emergency => "emergency",
        };
        write!(f, "{}", s)
    }
}

/// Which check produced an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    HealthSummary,
    RatioBelowMinimum,
    RatioAboveMaximum,
    RedemptionRisk,
    PositionModified,
}

/// A single notification, produced and dispatched within one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub kind: AlertKind,
    pub title: String,
    pub body: String,
    pub severity: Severity,
}

impl AlertEvent {
    /// Title shared by every alert this monitor sends.
    pub const TITLE: &'static str = "Liquity Trove Management";

    pub fn new(kind: AlertKind, body: impl Into<String>, severity: Severity) -> Self {
        Self {
            kind,
            title: Self::TITLE.to_string(),
            body: body.into(),
            severity,
        }
    }
}
