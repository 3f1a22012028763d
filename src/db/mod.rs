//! Persistence of the monitored position's last-seen snapshot.
//!
//! This module provides:
//! - The `SnapshotStore` seam used by the state tracker
//! - A SQLite-backed store with versioned records
//! - An in-memory store for tests

use crate::domain::{Address, PositionSnapshot};
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

pub mod memory;
pub mod migrations;
pub mod snapshots;

pub use memory::MemorySnapshotStore;
pub use migrations::init_db;
pub use snapshots::SqliteSnapshotStore;

/// Durable storage for one snapshot per monitored position.
#[async_trait]
pub trait SnapshotStore: Send + Sync + fmt::Debug {
    /// Last saved snapshot, or `None` if nothing was ever saved.
    async fn load(&self, position: &Address) -> Result<Option<PositionSnapshot>, StoreError>;

    /// Replace the stored snapshot atomically.
    async fn save(&self, position: &Address, snapshot: PositionSnapshot) -> Result<(), StoreError>;
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error(
        "stored snapshot has format version {found}, expected {expected}; remove it to start a new baseline"
    )]
    FormatMismatch { found: i64, expected: i64 },
    #[error("stored snapshot is corrupt: {0}")]
    Corrupt(String),
    #[error("snapshot store unavailable: {0}")]
    Unavailable(String),
}
