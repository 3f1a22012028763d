pub mod config;
pub mod datasource;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod notify;
pub mod orchestration;

pub use config::Config;
pub use datasource::{ChainClients, ChainError, MockChain, RpcChain};
pub use db::{init_db, MemorySnapshotStore, SnapshotStore, SqliteSnapshotStore};
pub use domain::{
    Address, AlertEvent, AlertKind, Decimal, Position, PositionSnapshot, PriceReading, Severity,
};
pub use error::MonitorError;
pub use notify::{Notifier, PushoverNotifier, RecordingNotifier};
pub use orchestration::{Monitor, MonitorSettings, RunOutcome, RunReport, RunStage};
