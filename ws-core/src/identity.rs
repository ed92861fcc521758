use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one workspace runtime instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RuntimeIdentity {
    pub workspace_id: String,
    pub env_name: String,
    pub owner: String,
}

impl RuntimeIdentity {
    pub fn new(
        workspace_id: impl Into<String>,
        env_name: impl Into<String>,
        owner: impl Into<String>,
    ) -> Self {
        Self {
            workspace_id: workspace_id.into(),
            env_name: env_name.into(),
            owner: owner.into(),
        }
    }
}

impl fmt::Display for RuntimeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.workspace_id, self.env_name, self.owner)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BootstrapperStatus {
    Starting,
    Done,
    Failed,
}

impl BootstrapperStatus {
    /// `Done` and `Failed` end a bootstrap attempt; `Starting` is informational.
    pub fn is_terminal(self) -> bool {
        matches!(self, BootstrapperStatus::Done | BootstrapperStatus::Failed)
    }
}

/// Status reported by the installer agents of one machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapStatusEvent {
    pub runtime_id: RuntimeIdentity,
    pub machine_name: String,
    pub status: BootstrapperStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BootstrapStatusEvent {
    pub fn new(
        runtime_id: RuntimeIdentity,
        machine_name: impl Into<String>,
        status: BootstrapperStatus,
    ) -> Self {
        Self {
            runtime_id,
            machine_name: machine_name.into(),
            status,
            error: None,
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}
