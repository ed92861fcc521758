use serde::{Deserialize, Serialize};
use ws_core::WorkspaceStatus;

/// Persisted liveness and idle-expiration state of one workspace.
///
/// Every timestamp is in epoch milliseconds. Records are repaired field by
/// field, so any combination of missing fields can be observed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceActivity {
    pub workspace_id: String,
    pub created: Option<i64>,
    pub status: Option<WorkspaceStatus>,
    pub last_starting: Option<i64>,
    pub last_running: Option<i64>,
    pub last_stopping: Option<i64>,
    pub last_stopped: Option<i64>,
    /// `last_running` (or the last activity) plus the idle timeout
    pub expiration: Option<i64>,
}

impl WorkspaceActivity {
    pub fn new(workspace_id: impl Into<String>) -> Self {
        Self {
            workspace_id: workspace_id.into(),
            ..Default::default()
        }
    }

    /// Record that the workspace entered `status` at `time`.
    pub fn set_status_change_time(&mut self, status: WorkspaceStatus, time: i64) {
        self.status = Some(status);
        let slot = match status {
            WorkspaceStatus::Starting => &mut self.last_starting,
            WorkspaceStatus::Running => &mut self.last_running,
            WorkspaceStatus::Stopping => &mut self.last_stopping,
            WorkspaceStatus::Stopped => &mut self.last_stopped,
        };
        *slot = Some(time);
    }

    /// `last_running` when it belongs to the current run of the workspace.
    ///
    /// A recorded status other than RUNNING means `last_running` is left over
    /// from an earlier run.
    pub fn current_run_last_running(&self) -> Option<i64> {
        match self.status {
            None | Some(WorkspaceStatus::Running) => self.last_running,
            Some(_) => None,
        }
    }
}
