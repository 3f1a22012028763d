//! SQLite-backed snapshot store.

use super::{SnapshotStore, StoreError};
use crate::domain::{Address, PositionSnapshot, TimeMs, SNAPSHOT_FORMAT_VERSION};
use async_trait::async_trait;
use sqlx::sqlite::SqlitePool;
use sqlx::Row;

/// Stores one row per position. Amounts are kept as decimal strings since
/// they exceed SQLite's 64-bit integers.
#[derive(Debug, Clone)]
pub struct SqliteSnapshotStore {
    pool: SqlitePool,
}

impl SqliteSnapshotStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn key(position: &Address) -> String {
        position.as_str().to_ascii_lowercase()
    }
}

fn parse_amount(field: &str, raw: &str) -> Result<u128, StoreError> {
    raw.parse::<u128>()
        .map_err(|e| StoreError::Corrupt(format!("{} {:?}: {}", field, raw, e)))
}

#[async_trait]
impl SnapshotStore for SqliteSnapshotStore {
    async fn load(&self, position: &Address) -> Result<Option<PositionSnapshot>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT format_version, debt, collateral
            FROM position_snapshots
            WHERE position = ?
            "#,
        )
        .bind(Self::key(position))
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let version: i64 = row.try_get("format_version")?;
        if version != SNAPSHOT_FORMAT_VERSION {
            return Err(StoreError::FormatMismatch {
                found: version,
                expected: SNAPSHOT_FORMAT_VERSION,
            });
        }

        let debt: String = row.try_get("debt")?;
        let collateral: String = row.try_get("collateral")?;
        Ok(Some(PositionSnapshot::new(
            parse_amount("debt", &debt)?,
            parse_amount("collateral", &collateral)?,
        )))
    }

    async fn save(&self, position: &Address, snapshot: PositionSnapshot) -> Result<(), StoreError> {
        // Dropping the transaction without commit rolls it back.
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            r#"
            INSERT INTO position_snapshots (position, format_version, debt, collateral, updated_at_ms)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(position) DO UPDATE SET
                format_version = excluded.format_version,
                debt = excluded.debt,
                collateral = excluded.collateral,
                updated_at_ms = excluded.updated_at_ms
            "#,
        )
        .bind(Self::key(position))
        .bind(SNAPSHOT_FORMAT_VERSION)
        .bind(snapshot.debt.to_string())
        .bind(snapshot.collateral.to_string())
        .bind(TimeMs::now().as_ms())
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(())
    }
}
