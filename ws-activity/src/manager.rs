use crate::dao::WorkspaceActivityDao;
use crate::error::Result;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use ws_core::{ChannelSubscriber, Clock, EventService, WorkspaceStatus, WorkspaceStatusEvent};

/// Records status transitions and user activity of workspaces.
#[derive(Clone)]
pub struct WorkspaceActivityManager {
    dao: Arc<dyn WorkspaceActivityDao>,
    idle_timeout: i64,
    clock: Arc<dyn Clock>,
}

impl WorkspaceActivityManager {
    pub fn new(dao: Arc<dyn WorkspaceActivityDao>, idle_timeout_ms: i64, clock: Arc<dyn Clock>) -> Self {
        Self {
            dao,
            idle_timeout: idle_timeout_ms,
            clock,
        }
    }

    /// Idle timeout in milliseconds.
    pub fn idle_timeout(&self) -> i64 {
        self.idle_timeout
    }

    /// Expiration of a workspace last active at `time`, clamped to `i64::MAX`.
    pub fn expiration_after(&self, time: i64) -> i64 {
        time.saturating_add(self.idle_timeout)
    }

    /// Push the expiration of a workspace out after user activity.
    pub async fn update(&self, workspace_id: &str, activity_time: i64) -> Result<()> {
        let expiration = self.expiration_after(activity_time);
        debug!(workspace_id, expiration, "Updating workspace expiration");
        self.dao.set_expiration_time(workspace_id, expiration).await
    }

    pub async fn handle_status_change(&self, event: &WorkspaceStatusEvent) -> Result<()> {
        let now = self.clock.now_millis();
        let workspace_id = event.workspace_id.as_str();

        self.dao
            .set_status_change_time(workspace_id, event.status, now)
            .await?;

        match event.status {
            WorkspaceStatus::Running => {
                self.dao
                    .set_expiration_time(workspace_id, self.expiration_after(now))
                    .await?
            }
            WorkspaceStatus::Stopped => self.dao.remove_expiration(workspace_id).await?,
            WorkspaceStatus::Starting | WorkspaceStatus::Stopping => {}
        }

        Ok(())
    }

    /// Forget everything about a removed workspace.
    pub async fn remove_activity(&self, workspace_id: &str) -> Result<()> {
        self.dao.remove_activity(workspace_id).await
    }

    /// Apply every status event published on `events` until the task is aborted.
    pub fn spawn_status_listener(
        &self,
        events: &Arc<EventService<WorkspaceStatusEvent>>,
    ) -> JoinHandle<()> {
        let (subscriber, mut receiver) = ChannelSubscriber::channel();
        let subscription = events.subscribe(subscriber);
        let manager = self.clone();

        tokio::spawn(async move {
            let _subscription = subscription;
            while let Some(event) = receiver.recv().await {
                if let Err(e) = manager.handle_status_change(&event).await {
                    warn!(
                        workspace_id = %event.workspace_id,
                        status = %event.status,
                        error = %e,
                        "Failed to record workspace status change"
                    );
                }
            }
        })
    }
}

impl std::fmt::Debug for WorkspaceActivityManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkspaceActivityManager")
            .field("idle_timeout", &self.idle_timeout)
            .finish_non_exhaustive()
    }
}
