//! Collaborators owned by the workspace master
//!
//! Activity tracking never manages workspaces itself; it asks the workspace
//! layer which workspaces are running, reads their metadata and requests
//! stops through these traits.

use crate::error::{ActivityError, Result};
use anyhow::Result as AnyResult;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Workspace attribute holding the creation time in epoch milliseconds.
pub const CREATED_ATTRIBUTE_NAME: &str = "created";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceInfo {
    pub id: String,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

impl WorkspaceInfo {
    /// Parse the creation timestamp attribute.
    pub fn created_time(&self) -> Result<i64> {
        let invalid = |reason: &str| ActivityError::InvalidAttribute {
            workspace_id: self.id.clone(),
            attribute: CREATED_ATTRIBUTE_NAME.to_string(),
            reason: reason.to_string(),
        };

        let raw = self
            .attributes
            .get(CREATED_ATTRIBUTE_NAME)
            .ok_or_else(|| invalid("attribute is missing"))?;

        raw.trim()
            .parse::<i64>()
            .map_err(|e| invalid(&format!("'{}' is not a timestamp: {}", raw, e)))
    }
}

/// Live view of the runtimes.
#[async_trait::async_trait]
pub trait WorkspaceRuntimes: Send + Sync {
    /// Ids of every workspace currently running.
    async fn running(&self) -> AnyResult<HashSet<String>>;
}

#[async_trait::async_trait]
pub trait WorkspaceManager: Send + Sync {
    async fn get_workspace(&self, workspace_id: &str) -> AnyResult<WorkspaceInfo>;

    /// Request a stop of a running workspace.
    async fn stop_workspace(&self, workspace_id: &str) -> AnyResult<()>;
}
