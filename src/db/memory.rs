//! In-memory snapshot store for tests.

use super::{SnapshotStore, StoreError};
use crate::domain::{Address, PositionSnapshot};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    snapshots: Mutex<HashMap<Address, PositionSnapshot>>,
    fail_loads: bool,
    fail_saves: bool,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `load` fail.
    pub fn failing_loads(mut self) -> Self {
        self.fail_loads = true;
        self
    }

    /// Make every `save` fail.
    pub fn failing_saves(mut self) -> Self {
        self.fail_saves = true;
        self
    }

    /// Seed a snapshot directly.
    pub fn insert(&self, position: &Address, snapshot: PositionSnapshot) {
        self.snapshots
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(position.clone(), snapshot);
    }

    /// Read a snapshot directly.
    pub fn get(&self, position: &Address) -> Option<PositionSnapshot> {
        self.snapshots
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(position)
            .copied()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn load(&self, position: &Address) -> Result<Option<PositionSnapshot>, StoreError> {
        if self.fail_loads {
            return Err(StoreError::Unavailable("load disabled".to_string()));
        }
        Ok(self.get(position))
    }

    async fn save(&self, position: &Address, snapshot: PositionSnapshot) -> Result<(), StoreError> {
        if self.fail_saves {
            return Err(StoreError::Unavailable("save disabled".to_string()));
        }
        self.insert(position, snapshot);
        Ok(())
    }
}
