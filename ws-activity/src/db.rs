use crate::error::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, instrument};

/// The activity checker and the HTTP handlers write concurrently.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_CONNECTIONS: u32 = 4;

/// Open the activity store at `db_path` and bring its schema up to date.
#[instrument(fields(db_path = %db_path.display()))]
pub async fn open_activity_store(db_path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);

    let pool = SqlitePoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Activity store ready");

    Ok(pool)
}

/// Copy an existing activity store aside before its schema is migrated.
///
/// Returns the copy's path, or `None` when there is nothing to copy yet.
pub fn snapshot_activity_store(db_path: &Path, taken_at_millis: i64) -> Result<Option<PathBuf>> {
    if !db_path.exists() {
        return Ok(None);
    }

    let snapshot = db_path.with_extension(format!("db.snapshot.{}", taken_at_millis));
    std::fs::copy(db_path, &snapshot)?;

    Ok(Some(snapshot))
}
