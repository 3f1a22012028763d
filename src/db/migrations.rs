//! Snapshot database initialization.

use sqlx::sqlite::{SqliteConnection, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use tracing::{debug, info};

/// Open (creating if needed) the snapshot database and apply the schema.
pub async fn init_db(db_path: &str) -> Result<SqlitePool, sqlx::Error> {
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(sqlx::Error::Io)?;
        }
    }

    // Single writer: one connection is enough and keeps read-then-write serial.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .after_connect(|conn, _meta| Box::pin(async move { configure_pragmas_conn(conn).await }))
        .connect(&format!("sqlite:{}?mode=rwc", db_path))
        .await?;

    run_migrations(&pool).await?;

    info!(path = %db_path, "Snapshot database ready");
    Ok(pool)
}

/// Apply `schema.sql`. Every statement is idempotent.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let schema_sql = include_str!("schema.sql");

    for statement in schema_sql.split(';') {
        let trimmed = statement.trim();
        if !trimmed.is_empty() {
            sqlx::query(trimmed).execute(pool).await?;
        }
    }

    debug!("Snapshot schema applied");
    Ok(())
}

async fn configure_pragmas_conn(conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    use sqlx::Row;

    // journal_mode returns the actual mode set; must use fetch to get result
    let row = sqlx::query("PRAGMA journal_mode = WAL")
        .fetch_one(&mut *conn)
        .await?;
    let journal_mode: String = row.get(0);
    debug!(journal_mode = %journal_mode, "SQLite journal mode");

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&mut *conn)
        .await?;
    sqlx::query("PRAGMA synchronous = FULL")
        .execute(&mut *conn)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn db_path(dir: &TempDir, rel: &str) -> String {
        dir.path().join(rel).to_string_lossy().to_string()
    }

    #[tokio::test]
    async fn test_init_db_creates_database_and_table() {
        let temp_dir = TempDir::new().unwrap();
        let path = db_path(&temp_dir, "trove.db");

        let pool = init_db(&path).await.expect("init_db failed");
        assert!(Path::new(&path).exists());

        let result: (String,) = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type='table' AND name='position_snapshots'",
        )
        .fetch_one(&pool)
        .await
        .expect("query failed");
        assert_eq!(result.0, "position_snapshots");
    }

    #[tokio::test]
    async fn test_init_db_creates_missing_parent_dir() {
        let temp_dir = TempDir::new().unwrap();
        let path = db_path(&temp_dir, "state/nested/trove.db");
        init_db(&path).await.expect("init_db failed");
        assert!(Path::new(&path).exists());
    }

    #[tokio::test]
    async fn test_migrations_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let path = db_path(&temp_dir, "trove.db");
        let pool = init_db(&path).await.expect("init_db failed");

        run_migrations(&pool)
            .await
            .expect("second migration run failed");
        drop(pool);
        init_db(&path).await.expect("reopen failed");
    }

    #[tokio::test]
    async fn test_synchronous_full() {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_db(&db_path(&temp_dir, "trove.db"))
            .await
            .expect("init_db failed");

        // 2 == FULL
        let result: (i64,) = sqlx::query_as("PRAGMA synchronous")
            .fetch_one(&pool)
            .await
            .expect("query failed");
        assert_eq!(result.0, 2);
    }
}
