//! HTTP client for the workspace master REST API

use anyhow::{anyhow, bail, Context, Result};
use reqwest::StatusCode;
use std::collections::HashSet;
use std::time::Duration;
use tracing::debug;
use url::Url;
use ws_activity::{WorkspaceInfo, WorkspaceManager, WorkspaceRuntimes};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Answers the activity checker's questions about workspaces by calling the
/// workspace master.
#[derive(Debug, Clone)]
pub struct WorkspaceMasterClient {
    http: reqwest::Client,
    base: Url,
}

impl WorkspaceMasterClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url)
            .with_context(|| format!("Invalid workspace master URL: {}", base_url))?;
        if base.cannot_be_a_base() {
            bail!("Workspace master URL cannot carry a path: {}", base_url);
        }

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { http, base })
    }

    /// Base URL with `segments` appended, each percent-encoded as one segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("Workspace master URL cannot carry a path: {}", self.base))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn workspace_endpoint(&self, workspace_id: &str, action: Option<&str>) -> Result<Url> {
        // Url drops dot segments instead of encoding them
        if matches!(workspace_id, "" | "." | "..") {
            bail!("Invalid workspace id: '{}'", workspace_id);
        }

        let mut segments = vec!["api", "workspace", workspace_id];
        segments.extend(action);
        self.endpoint(&segments)
    }
}

#[async_trait::async_trait]
impl WorkspaceRuntimes for WorkspaceMasterClient {
    async fn running(&self) -> Result<HashSet<String>> {
        let url = self.endpoint(&["api", "workspace", "running"])?;
        let ids: Vec<String> = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .context("Unexpected running workspaces response")?;

        debug!(count = ids.len(), "Fetched running workspaces");
        Ok(ids.into_iter().collect())
    }
}

#[async_trait::async_trait]
impl WorkspaceManager for WorkspaceMasterClient {
    async fn get_workspace(&self, workspace_id: &str) -> Result<WorkspaceInfo> {
        let url = self.workspace_endpoint(workspace_id, None)?;
        let response = self.http.get(url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            bail!("Workspace {} not found", workspace_id);
        }

        let workspace = response
            .error_for_status()?
            .json()
            .await
            .with_context(|| format!("Unexpected response for workspace {}", workspace_id))?;

        Ok(workspace)
    }

    async fn stop_workspace(&self, workspace_id: &str) -> Result<()> {
        let url = self.workspace_endpoint(workspace_id, Some("stop"))?;
        self.http.post(url).send().await?.error_for_status()?;

        debug!(workspace_id, "Requested workspace stop");
        Ok(())
    }
}
