//! Detects changes to the monitored position made outside this monitor by
//! comparing against the snapshot persisted on the previous run.

use crate::db::{SnapshotStore, StoreError};
use crate::domain::position::find_position;
use crate::domain::{Address, Position, PositionSnapshot};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Outcome of comparing the stored snapshot with the current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeResult {
    /// Nothing stored yet; the current values become the baseline.
    FirstObservation,
    Unmodified,
    Modified {
        previous: PositionSnapshot,
        current: PositionSnapshot,
    },
    /// The monitored position is not in the current list (e.g. closed).
    PositionAbsent,
}

impl ChangeResult {
    pub fn is_modified(&self) -> bool {
        matches!(self, ChangeResult::Modified { .. })
    }
}

/// Pure comparison of the persisted pair with the current position.
pub fn compare(persisted: Option<PositionSnapshot>, current: Option<&Position>) -> ChangeResult {
    let Some(current) = current else {
        return ChangeResult::PositionAbsent;
    };
    let current = PositionSnapshot::from(current);
    match persisted {
        None => ChangeResult::FirstObservation,
        Some(previous) if previous == current => ChangeResult::Unmodified,
        Some(previous) => ChangeResult::Modified { previous, current },
    }
}

/// Result of one tracking pass.
///
/// The comparison stands even when saving the new snapshot failed.
#[derive(Debug)]
pub struct Tracked {
    pub change: ChangeResult,
    pub save_error: Option<StoreError>,
}

/// Loads, compares and re-persists the snapshot of one position.
pub struct StateTracker<'a> {
    store: &'a dyn SnapshotStore,
    position: &'a Address,
}

impl<'a> StateTracker<'a> {
    pub fn new(store: &'a dyn SnapshotStore, position: &'a Address) -> Self {
        Self { store, position }
    }

    /// Compare the stored snapshot with the position's entry in `positions`
    /// and overwrite the snapshot with the current values when the position
    /// is present. An absent position leaves the snapshot untouched.
    ///
    /// A snapshot that cannot be read is never overwritten; that case is the
    /// only error. A failed save is reported in [`Tracked::save_error`].
    pub async fn track(&self, positions: &[Position]) -> Result<Tracked, StoreError> {
        let persisted = self.store.load(self.position).await?;
        let current = find_position(positions, self.position);
        let change = compare(persisted, current);

        let save_error = match current {
            Some(current) => self.persist(current).await.err(),
            None => {
                info!(
                    position = %self.position,
                    "Monitored position not found in sorted list; snapshot left untouched"
                );
                None
            }
        };

        Ok(Tracked { change, save_error })
    }

    /// Overwrite the stored snapshot with `current`.
    pub async fn persist(&self, current: &Position) -> Result<(), StoreError> {
        let snapshot = PositionSnapshot::from(current);
        self.store.save(self.position, snapshot).await?;
        debug!(
            position = %self.position,
            debt = %snapshot.debt,
            collateral = %snapshot.collateral,
            "Snapshot saved"
        );
        Ok(())
    }
}
