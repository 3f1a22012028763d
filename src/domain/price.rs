//! Price oracle readings.

use super::decimal::{Decimal, ScaleError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw aggregator answer together with the exponent it is scaled by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceReading {
    pub answer: u128,
    pub decimals: u32,
}

impl PriceReading {
    pub fn new(answer: u128, decimals: u32) -> Self {
        Self { answer, decimals }
    }

    /// Price in quote units per collateral unit (e.g. USD per ETH).
    pub fn value(&self) -> Result<Decimal, ScaleError> {
        Decimal::from_scaled(self.answer, self.decimals)
    }
}

/// Liquity `PriceFeed.status()` values. Only `ChainlinkWorking` is trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OracleStatus {
    ChainlinkWorking,
    UsingTellorChainlinkUntrusted,
    BothOraclesUntrusted,
    UsingTellorChainlinkFrozen,
    UsingChainlinkTellorUntrusted,
    Unknown(u64),
}

impl OracleStatus {
    /// Status code of the healthy primary feed.
    pub const NORMAL_CODE: u64 = 0;

    pub fn from_code(code: u64) -> Self {
        match code {
            0 => OracleStatus::ChainlinkWorking,
            1 => OracleStatus::UsingTellorChainlinkUntrusted,
            2 => OracleStatus::BothOraclesUntrusted,
            3 => OracleStatus::UsingTellorChainlinkFrozen,
            4 => OracleStatus::UsingChainlinkTellorUntrusted,
            other => OracleStatus::Unknown(other),
        }
    }

    pub fn code(&self) -> u64 {
        match self {
            OracleStatus::ChainlinkWorking => 0,
            OracleStatus::UsingTellorChainlinkUntrusted => 1,
            OracleStatus::BothOraclesUntrusted => 2,
            OracleStatus::UsingTellorChainlinkFrozen => 3,
            OracleStatus::UsingChainlinkTellorUntrusted => 4,
            OracleStatus::Unknown(code) => *code,
        }
    }

    pub fn is_normal(&self) -> bool {
        self.code() == Self::NORMAL_CODE
    }
}

impl fmt::Display for OracleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OracleStatus::ChainlinkWorking => write!(f, "chainlinkWorking"),
            OracleStatus::UsingTellorChainlinkUntrusted => {
                write!(f, "usingTellorChainlinkUntrusted")
            }
            OracleStatus::BothOraclesUntrusted => write!(f, "bothOraclesUntrusted"),
            OracleStatus::UsingTellorChainlinkFrozen => write!(f, "usingTellorChainlinkFrozen"),
            OracleStatus::UsingChainlinkTellorUntrusted => {
                write!(f, "usingChainlinkTellorUntrusted")
            }
            OracleStatus::Unknown(code) => write!(f, "unknown({})", code),
        }
    }
}
