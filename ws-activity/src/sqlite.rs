use crate::activity::WorkspaceActivity;
use crate::dao::WorkspaceActivityDao;
use crate::error::{ActivityError, Result};
use sqlx::SqlitePool;
use ws_core::WorkspaceStatus;

/// [`WorkspaceActivityDao`] backed by the `workspace_activity` SQLite table.
#[derive(Debug, Clone)]
pub struct SqliteActivityDao {
    pool: SqlitePool,
}

impl SqliteActivityDao {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a reference to the database pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Upsert a single nullable integer column.
    async fn set_column(&self, workspace_id: &str, column: &'static str, value: i64) -> Result<()> {
        let query = format!(
            "INSERT INTO workspace_activity (workspace_id, {column}) VALUES (?, ?)
             ON CONFLICT(workspace_id) DO UPDATE SET {column} = excluded.{column}"
        );

        sqlx::query(&query)
            .bind(workspace_id)
            .bind(value)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

fn status_column(status: WorkspaceStatus) -> &'static str {
    match status {
        WorkspaceStatus::Starting => "last_starting",
        WorkspaceStatus::Running => "last_running",
        WorkspaceStatus::Stopping => "last_stopping",
        WorkspaceStatus::Stopped => "last_stopped",
    }
}

#[async_trait::async_trait]
impl WorkspaceActivityDao for SqliteActivityDao {
    async fn find_expired(&self, timestamp: i64) -> Result<Vec<String>> {
        let ids = sqlx::query_scalar::<_, String>(
            "SELECT workspace_id FROM workspace_activity
             WHERE expiration IS NOT NULL AND expiration <= ?
             ORDER BY expiration",
        )
        .bind(timestamp)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    async fn remove_expiration(&self, workspace_id: &str) -> Result<()> {
        sqlx::query("UPDATE workspace_activity SET expiration = NULL WHERE workspace_id = ?")
            .bind(workspace_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn set_expiration_time(&self, workspace_id: &str, expiration: i64) -> Result<()> {
        self.set_column(workspace_id, "expiration", expiration).await
    }

    async fn find_activity(&self, workspace_id: &str) -> Result<Option<WorkspaceActivity>> {
        let row = sqlx::query_as::<_, ActivityRow>(
            "SELECT * FROM workspace_activity WHERE workspace_id = ?",
        )
        .bind(workspace_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(WorkspaceActivity::try_from).transpose()
    }

    async fn create_activity(&self, activity: &WorkspaceActivity) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO workspace_activity
                (workspace_id, created, status, last_starting, last_running, last_stopping, last_stopped, expiration)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&activity.workspace_id)
        .bind(activity.created)
        .bind(activity.status.map(|s| s.as_str()))
        .bind(activity.last_starting)
        .bind(activity.last_running)
        .bind(activity.last_stopping)
        .bind(activity.last_stopped)
        .bind(activity.expiration)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn set_created_time(&self, workspace_id: &str, created: i64) -> Result<()> {
        self.set_column(workspace_id, "created", created).await
    }

    async fn set_status_change_time(
        &self,
        workspace_id: &str,
        status: WorkspaceStatus,
        time: i64,
    ) -> Result<()> {
        let column = status_column(status);
        let query = format!(
            "INSERT INTO workspace_activity (workspace_id, status, {column}) VALUES (?, ?, ?)
             ON CONFLICT(workspace_id) DO UPDATE SET status = excluded.status, {column} = excluded.{column}"
        );

        sqlx::query(&query)
            .bind(workspace_id)
            .bind(status.as_str())
            .bind(time)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn remove_activity(&self, workspace_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM workspace_activity WHERE workspace_id = ?")
            .bind(workspace_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

// Internal row type for sqlx
#[derive(sqlx::FromRow)]
struct ActivityRow {
    workspace_id: String,
    created: Option<i64>,
    status: Option<String>,
    last_starting: Option<i64>,
    last_running: Option<i64>,
    last_stopping: Option<i64>,
    last_stopped: Option<i64>,
    expiration: Option<i64>,
}

impl TryFrom<ActivityRow> for WorkspaceActivity {
    type Error = ActivityError;

    fn try_from(row: ActivityRow) -> Result<Self> {
        let status = row
            .status
            .map(|s| s.parse::<WorkspaceStatus>())
            .transpose()
            .map_err(|e| {
                ActivityError::InvalidState(format!(
                    "activity of workspace {}: {}",
                    row.workspace_id, e
                ))
            })?;

        Ok(Self {
            workspace_id: row.workspace_id,
            created: row.created,
            status,
            last_starting: row.last_starting,
            last_running: row.last_running,
            last_stopping: row.last_stopping,
            last_stopped: row.last_stopped,
            expiration: row.expiration,
        })
    }
}
