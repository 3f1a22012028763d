#![allow(dead_code)]

use std::sync::Arc;
use trovewatch::datasource::ChainClients;
use trovewatch::engine::Thresholds;
use trovewatch::{
    Address, Decimal, MockChain, Monitor, MonitorSettings, Notifier, Position, SnapshotStore,
};

pub const E18: u128 = 1_000_000_000_000_000_000;
pub const PRICE_2000: u128 = 2000 * 100_000_000;

pub fn d(s: &str) -> Decimal {
    Decimal::from_str_canonical(s).unwrap()
}

pub fn me() -> Address {
    Address::parse("0x00000000000000000000000000000000000000aa").unwrap()
}

pub fn other(n: u8) -> Address {
    Address::from_bytes([n; 20])
}

/// Whole-unit debt and collateral.
pub fn pos(address: Address, debt: u128, coll: u128) -> Position {
    Position::new(address, debt * E18, coll * E18)
}

pub fn settings() -> MonitorSettings {
    MonitorSettings {
        position: me(),
        thresholds: Thresholds {
            min_ratio: d("1.10"),
            max_ratio: d("3.0"),
            redemption_buffer: d("5"),
        },
        expected_oracle_decimals: 8,
    }
}

/// One trove at 1.25 ahead with 1 ETH, the monitored trove at 2.0 with
/// 2 ETH, and a safer trove at 2.5 with 10 ETH.
pub fn scenario_chain() -> MockChain {
    MockChain::new()
        .with_price(PRICE_2000)
        .with_position(pos(other(1), 1600, 1))
        .with_position(pos(me(), 2000, 2))
        .with_position(pos(other(2), 8000, 10))
}

pub fn monitor(
    chain: MockChain,
    store: Arc<dyn SnapshotStore>,
    notifier: Arc<dyn Notifier>,
) -> Monitor {
    Monitor::new(
        settings(),
        ChainClients::shared(Arc::new(chain)),
        store,
        notifier,
    )
}
