//! On-chain collaborators: price oracle, position registry and sorted
//! position list.

use crate::domain::{Address, OracleStatus, PositionList};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

pub mod abi;
pub mod mock;
pub mod rpc;

pub use mock::MockChain;
pub use rpc::{ContractAddresses, RpcChain};

/// Price feed health and the aggregator's latest answer.
#[async_trait]
pub trait PriceOracle: Send + Sync + fmt::Debug {
    /// Feed status; only `ChainlinkWorking` may be trusted.
    async fn status(&self) -> Result<OracleStatus, ChainError>;

    /// Decimal exponent of `latest_price`.
    async fn decimals(&self) -> Result<u32, ChainError>;

    /// Latest aggregator answer, scaled by `decimals`.
    async fn latest_price(&self) -> Result<u128, ChainError>;
}

/// Protocol registry of positions.
#[async_trait]
pub trait PositionRegistry: Send + Sync + fmt::Debug {
    /// Debt and collateral of one position, including pending rewards.
    async fn position(&self, address: &Address) -> Result<(u128, u128), ChainError>;

    /// The protocol's own ratio for `address` at `price`, scaled like `price`.
    ///
    /// Informational only; the engine computes its own ratio.
    async fn current_ratio(&self, address: &Address, price: u128) -> Result<u128, ChainError>;

    /// Number of open positions.
    async fn position_count(&self) -> Result<u64, ChainError>;
}

/// Globally sorted list of positions.
#[async_trait]
pub trait PositionListSource: Send + Sync + fmt::Debug {
    /// Up to `count` positions, lowest collateral ratio first.
    async fn sorted_positions(&self, count: u64) -> Result<PositionList, ChainError>;
}

/// Explicit bundle of chain handles passed into the monitor.
#[derive(Debug, Clone)]
pub struct ChainClients {
    pub oracle: Arc<dyn PriceOracle>,
    pub registry: Arc<dyn PositionRegistry>,
    pub positions: Arc<dyn PositionListSource>,
}

impl ChainClients {
    pub fn new(
        oracle: Arc<dyn PriceOracle>,
        registry: Arc<dyn PositionRegistry>,
        positions: Arc<dyn PositionListSource>,
    ) -> Self {
        Self {
            oracle,
            registry,
            positions,
        }
    }

    /// Use one client for all three roles.
    pub fn shared<C>(client: Arc<C>) -> Self
    where
        C: PriceOracle + PositionRegistry + PositionListSource + 'static,
    {
        Self {
            oracle: client.clone(),
            registry: client.clone(),
            positions: client,
        }
    }
}

/// Error type for chain reads.
#[derive(Debug, Clone)]
pub enum ChainError {
    /// Network error (e.g., connection timeout, DNS failure)
    NetworkError(String),
    /// HTTP error (e.g., 429 rate limit, 5xx server error)
    HttpError { status: u16, message: String },
    /// The node answered with a JSON-RPC error (e.g. execution reverted)
    RpcError { code: i64, message: String },
    /// Malformed JSON or ABI data
    ParseError(String),
    /// Rate limit exceeded
    RateLimited,
    /// Other error
    Other(String),
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            ChainError::HttpError { status, message } => {
                write!(f, "HTTP error {}: {}", status, message)
            }
            ChainError::RpcError { code, message } => {
                write!(f, "RPC error {}: {}", code, message)
            }
            ChainError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ChainError::RateLimited => write!(f, "Rate limited"),
            ChainError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for ChainError {}

impl From<abi::AbiError> for ChainError {
    fn from(err: abi::AbiError) -> Self {
        ChainError::ParseError(err.to_string())
    }
}
