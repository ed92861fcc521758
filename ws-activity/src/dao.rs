use crate::activity::WorkspaceActivity;
use crate::error::Result;
use ws_core::WorkspaceStatus;

/// Storage of workspace activity records.
///
/// Setters touch a single field and create the record when it does not
/// exist yet, so concurrent writers never clobber each other's fields.
#[async_trait::async_trait]
pub trait WorkspaceActivityDao: Send + Sync {
    /// Ids of workspaces whose expiration is at or before `timestamp`.
    async fn find_expired(&self, timestamp: i64) -> Result<Vec<String>>;

    async fn remove_expiration(&self, workspace_id: &str) -> Result<()>;

    async fn set_expiration_time(&self, workspace_id: &str, expiration: i64) -> Result<()>;

    async fn find_activity(&self, workspace_id: &str) -> Result<Option<WorkspaceActivity>>;

    async fn create_activity(&self, activity: &WorkspaceActivity) -> Result<()>;

    async fn set_created_time(&self, workspace_id: &str, created: i64) -> Result<()>;

    /// Sets `status` and the matching `last_*` timestamp.
    async fn set_status_change_time(
        &self,
        workspace_id: &str,
        status: WorkspaceStatus,
        time: i64,
    ) -> Result<()>;

    async fn remove_activity(&self, workspace_id: &str) -> Result<()>;
}
