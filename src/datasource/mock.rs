//! Mock chain for testing without network calls.

use super::{ChainError, PositionListSource, PositionRegistry, PriceOracle};
use crate::domain::{Address, OracleStatus, Position, PositionList};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Calls that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockCall {
    Status,
    Decimals,
    LatestPrice,
    Position,
    CurrentRatio,
    PositionCount,
    SortedPositions,
}

/// Mock chain that returns predefined state.
///
/// `position()` answers from the sorted list, falling back to `(0, 0)` for
/// unknown addresses like the real TroveManager does for closed troves.
#[derive(Debug, Clone)]
pub struct MockChain {
    status: OracleStatus,
    decimals: u32,
    price: u128,
    positions: Vec<Position>,
    position_count: Option<u64>,
    failing: HashSet<MockCall>,
    list_calls: Arc<AtomicUsize>,
}

impl MockChain {
    /// Healthy feed with 8 decimals, zero price and no positions.
    pub fn new() -> Self {
        Self {
            status: OracleStatus::ChainlinkWorking,
            decimals: 8,
            price: 0,
            positions: Vec::new(),
            position_count: None,
            failing: HashSet::new(),
            list_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_status(mut self, status: OracleStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_decimals(mut self, decimals: u32) -> Self {
        self.decimals = decimals;
        self
    }

    /// Set the raw aggregator answer.
    pub fn with_price(mut self, answer: u128) -> Self {
        self.price = answer;
        self
    }

    /// Append a position to the sorted list. Callers keep the list ordered.
    pub fn with_position(mut self, position: Position) -> Self {
        self.positions.push(position);
        self
    }

    pub fn with_positions(mut self, positions: Vec<Position>) -> Self {
        self.positions.extend(positions);
        self
    }

    /// Override the reported count (defaults to the list length).
    pub fn with_position_count(mut self, count: u64) -> Self {
        self.position_count = Some(count);
        self
    }

    /// Make `call` return a network error.
    pub fn failing(mut self, call: MockCall) -> Self {
        self.failing.insert(call);
        self
    }

    /// Number of times the sorted list was requested.
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    fn check(&self, call: MockCall) -> Result<(), ChainError> {
        if self.failing.contains(&call) {
            return Err(ChainError::NetworkError(format!("{:?} unavailable", call)));
        }
        Ok(())
    }
}

impl Default for MockChain {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PriceOracle for MockChain {
    async fn status(&self) -> Result<OracleStatus, ChainError> {
        self.check(MockCall::Status)?;
        Ok(self.status)
    }

    async fn decimals(&self) -> Result<u32, ChainError> {
        self.check(MockCall::Decimals)?;
        Ok(self.decimals)
    }

    async fn latest_price(&self) -> Result<u128, ChainError> {
        self.check(MockCall::LatestPrice)?;
        Ok(self.price)
    }
}

#[async_trait]
impl PositionRegistry for MockChain {
    async fn position(&self, address: &Address) -> Result<(u128, u128), ChainError> {
        self.check(MockCall::Position)?;
        Ok(self
            .positions
            .iter()
            .find(|p| &p.address == address)
            .map(|p| (p.debt, p.collateral))
            .unwrap_or((0, 0)))
    }

    async fn current_ratio(&self, address: &Address, price: u128) -> Result<u128, ChainError> {
        self.check(MockCall::CurrentRatio)?;
        let (debt, coll) = self.position(address).await?;
        if debt == 0 {
            return Ok(u128::MAX);
        }
        // Same scaling as the contract when handed a raw 8-decimal price.
        Ok(coll.saturating_mul(price) / debt)
    }

    async fn position_count(&self) -> Result<u64, ChainError> {
        self.check(MockCall::PositionCount)?;
        Ok(self
            .position_count
            .unwrap_or(self.positions.len() as u64))
    }
}

#[async_trait]
impl PositionListSource for MockChain {
    async fn sorted_positions(&self, count: u64) -> Result<PositionList, ChainError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.check(MockCall::SortedPositions)?;
        let take = usize::try_from(count).unwrap_or(usize::MAX);
        Ok(self.positions.iter().take(take).cloned().collect())
    }
}
