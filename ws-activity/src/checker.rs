use crate::activity::WorkspaceActivity;
use crate::dao::WorkspaceActivityDao;
use crate::error::{ActivityError, Result};
use crate::manager::WorkspaceActivityManager;
use crate::workspace::{WorkspaceManager, WorkspaceRuntimes};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use ws_core::{Clock, WorkspaceStatus};

/// Skew tolerated between a last-running time and now before the expiration
/// is recomputed from it.
const EXPIRATION_REWRITE_THRESHOLD_MS: i64 = 1_000;

/// Order of the two steps applied to an expired workspace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExpiryOrdering {
    /// Stop the workspace, then clear its expiration even if the stop failed.
    #[default]
    StopThenClear,
    /// Clear the expiration first, then stop the workspace.
    ClearThenStop,
}

impl FromStr for ExpiryOrdering {
    type Err = ActivityError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stop-then-clear" => Ok(ExpiryOrdering::StopThenClear),
            "clear-then-stop" => Ok(ExpiryOrdering::ClearThenStop),
            other => Err(ActivityError::InvalidState(format!(
                "unknown expiry ordering '{}', expected stop-then-clear or clear-then-stop",
                other
            ))),
        }
    }
}

/// Periodic reconciliation of activity records against running workspaces.
///
/// Each [`validate`](WorkspaceActivityChecker::validate) call stops expired
/// workspaces and then repairs the records of running ones. A single
/// workspace failing never stops the rest of the pass.
pub struct WorkspaceActivityChecker {
    dao: Arc<dyn WorkspaceActivityDao>,
    workspace_manager: Arc<dyn WorkspaceManager>,
    runtimes: Arc<dyn WorkspaceRuntimes>,
    activity_manager: WorkspaceActivityManager,
    clock: Arc<dyn Clock>,
    expiry_ordering: ExpiryOrdering,
}

impl WorkspaceActivityChecker {
    pub fn new(
        dao: Arc<dyn WorkspaceActivityDao>,
        workspace_manager: Arc<dyn WorkspaceManager>,
        runtimes: Arc<dyn WorkspaceRuntimes>,
        activity_manager: WorkspaceActivityManager,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            dao,
            workspace_manager,
            runtimes,
            activity_manager,
            clock,
            expiry_ordering: ExpiryOrdering::default(),
        }
    }

    pub fn with_expiry_ordering(mut self, ordering: ExpiryOrdering) -> Self {
        self.expiry_ordering = ordering;
        self
    }

    /// Run one reconciliation tick.
    #[instrument(skip(self))]
    pub async fn validate(&self) {
        self.stop_expired().await;
        self.check_activity_records().await;
    }

    async fn stop_expired(&self) {
        let now = self.clock.now_millis();
        let expired = match self.dao.find_expired(now).await {
            Ok(ids) => ids,
            Err(e) => {
                warn!(error = %e, "Failed to look up expired workspaces");
                return;
            }
        };

        for workspace_id in expired {
            info!(workspace_id = %workspace_id, "Workspace idle timeout reached, stopping it");
            match self.expiry_ordering {
                ExpiryOrdering::StopThenClear => {
                    self.stop_workspace(&workspace_id).await;
                    self.clear_expiration(&workspace_id).await;
                }
                ExpiryOrdering::ClearThenStop => {
                    self.clear_expiration(&workspace_id).await;
                    self.stop_workspace(&workspace_id).await;
                }
            }
        }
    }

    async fn stop_workspace(&self, workspace_id: &str) {
        if let Err(e) = self.workspace_manager.stop_workspace(workspace_id).await {
            warn!(workspace_id, error = %e, "Failed to stop expired workspace");
        }
    }

    async fn clear_expiration(&self, workspace_id: &str) {
        if let Err(e) = self.dao.remove_expiration(workspace_id).await {
            warn!(workspace_id, error = %e, "Failed to clear workspace expiration");
        }
    }

    async fn check_activity_records(&self) {
        let running = match self.runtimes.running().await {
            Ok(ids) => ids,
            Err(e) => {
                warn!(error = %e, "Failed to list running workspaces");
                return;
            }
        };

        for workspace_id in running {
            if let Err(e) = self.check_activity_record(&workspace_id).await {
                warn!(
                    workspace_id = %workspace_id,
                    error = %e,
                    "Failed to repair activity record"
                );
            }
        }
    }

    async fn check_activity_record(&self, workspace_id: &str) -> Result<()> {
        let now = self.clock.now_millis();

        let Some(activity) = self.dao.find_activity(workspace_id).await? else {
            info!(workspace_id, "Restoring missing activity record of running workspace");
            let activity = WorkspaceActivity {
                workspace_id: workspace_id.to_string(),
                created: self.created_time(workspace_id).await,
                status: Some(WorkspaceStatus::Running),
                last_running: Some(now),
                expiration: Some(self.activity_manager.expiration_after(now)),
                ..Default::default()
            };
            return self.dao.create_activity(&activity).await;
        };

        if activity.created.is_none() {
            if let Some(created) = self.created_time(workspace_id).await {
                debug!(workspace_id, created, "Restoring created time");
                self.dao.set_created_time(workspace_id, created).await?;
            }
        }

        let (last_running, restored) = match activity.current_run_last_running() {
            Some(last_running) => (last_running, false),
            None => {
                let derived = derive_last_running(&activity, now);
                debug!(workspace_id, last_running = derived, "Restoring last running time");
                self.dao
                    .set_status_change_time(workspace_id, WorkspaceStatus::Running, derived)
                    .await?;
                (derived, true)
            }
        };

        if (restored || activity.expiration.is_none())
            && now.saturating_sub(last_running) > EXPIRATION_REWRITE_THRESHOLD_MS
        {
            let expiration = self.activity_manager.expiration_after(last_running);
            debug!(workspace_id, expiration, "Restoring expiration time");
            self.dao.set_expiration_time(workspace_id, expiration).await?;
        }

        Ok(())
    }

    /// Creation time from the workspace attributes; failures are logged.
    async fn created_time(&self, workspace_id: &str) -> Option<i64> {
        let created = match self.workspace_manager.get_workspace(workspace_id).await {
            Ok(workspace) => workspace.created_time(),
            Err(e) => Err(ActivityError::Workspace(e)),
        };

        match created {
            Ok(created) => Some(created),
            Err(e) => {
                warn!(workspace_id, error = %e, "Cannot determine workspace creation time");
                None
            }
        }
    }
}

/// Best estimate of when a running workspace with a stale record started running.
fn derive_last_running(activity: &WorkspaceActivity, now: i64) -> i64 {
    let last_starting = match activity.status {
        Some(WorkspaceStatus::Stopping | WorkspaceStatus::Stopped) => None,
        _ => activity.last_starting,
    };
    last_starting.unwrap_or(now)
}

impl std::fmt::Debug for WorkspaceActivityChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkspaceActivityChecker")
            .field("activity_manager", &self.activity_manager)
            .field("expiry_ordering", &self.expiry_ordering)
            .finish_non_exhaustive()
    }
}
