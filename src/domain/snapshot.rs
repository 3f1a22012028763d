//! Persisted last-seen state of the monitored position.

use super::position::Position;
use serde::{Deserialize, Serialize};

/// Current on-disk record format. Bump when the stored layout changes; a
/// stored record with any other version is refused.
pub const SNAPSHOT_FORMAT_VERSION: i64 = 1;

/// Last observed (debt, collateral) pair of the monitored position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionSnapshot {
    pub debt: u128,
    pub collateral: u128,
}

impl PositionSnapshot {
    pub fn new(debt: u128, collateral: u128) -> Self {
        Self { debt, collateral }
    }
}

impl From<&Position> for PositionSnapshot {
    fn from(position: &Position) -> Self {
        Self::new(position.debt, position.collateral)
    }
}
