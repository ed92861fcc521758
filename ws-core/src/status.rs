use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WorkspaceStatus {
    Starting,
    Running,
    Stopping,
    Stopped,
}

impl WorkspaceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkspaceStatus::Starting => "STARTING",
            WorkspaceStatus::Running => "RUNNING",
            WorkspaceStatus::Stopping => "STOPPING",
            WorkspaceStatus::Stopped => "STOPPED",
        }
    }
}

impl fmt::Display for WorkspaceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkspaceStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "STARTING" => Ok(WorkspaceStatus::Starting),
            "RUNNING" => Ok(WorkspaceStatus::Running),
            "STOPPING" => Ok(WorkspaceStatus::Stopping),
            "STOPPED" => Ok(WorkspaceStatus::Stopped),
            other => Err(CoreError::UnknownStatus(other.to_string())),
        }
    }
}

/// Published whenever a workspace moves to a new status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceStatusEvent {
    pub workspace_id: String,
    pub status: WorkspaceStatus,
}

impl WorkspaceStatusEvent {
    pub fn new(workspace_id: impl Into<String>, status: WorkspaceStatus) -> Self {
        Self {
            workspace_id: workspace_id.into(),
            status,
        }
    }
}
