//! Common test utilities for ws-activity tests
//!
//! Provides an in-memory DAO that records every call, fake workspace
//! collaborators and an in-memory SQLite database.

#![allow(dead_code)]

use sqlx::SqlitePool;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use ws_activity::{
    ActivityError, WorkspaceActivity, WorkspaceActivityDao, WorkspaceInfo, WorkspaceManager,
    WorkspaceRuntimes, CREATED_ATTRIBUTE_NAME,
};
use ws_core::WorkspaceStatus;

pub const IDLE_TIMEOUT: i64 = 60_000; // 1 minute

/// Shared, ordered log of side effects across fakes.
pub type Journal = Arc<Mutex<Vec<String>>>;

/// Helper to create an in-memory test database with migrations
pub async fn create_test_db() -> SqlitePool {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DaoCall {
    FindExpired(i64),
    RemoveExpiration(String),
    SetExpirationTime(String, i64),
    FindActivity(String),
    CreateActivity(WorkspaceActivity),
    SetCreatedTime(String, i64),
    SetStatusChangeTime(String, WorkspaceStatus, i64),
    RemoveActivity(String),
}

impl DaoCall {
    pub fn is_write(&self) -> bool {
        !matches!(self, DaoCall::FindExpired(_) | DaoCall::FindActivity(_))
    }
}

/// In-memory DAO that applies writes and records every call.
#[derive(Default)]
pub struct RecordingDao {
    records: Mutex<HashMap<String, WorkspaceActivity>>,
    calls: Mutex<Vec<DaoCall>>,
    expired_override: Mutex<Option<Vec<String>>>,
    failing: Mutex<HashSet<String>>,
    journal: Journal,
}

impl RecordingDao {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_journal(journal: Journal) -> Arc<Self> {
        Arc::new(Self {
            journal,
            ..Default::default()
        })
    }

    pub fn insert(&self, activity: WorkspaceActivity) {
        self.records
            .lock()
            .unwrap()
            .insert(activity.workspace_id.clone(), activity);
    }

    pub fn record(&self, workspace_id: &str) -> Option<WorkspaceActivity> {
        self.records.lock().unwrap().get(workspace_id).cloned()
    }

    /// Make `find_expired` return exactly these ids.
    pub fn set_expired(&self, ids: &[&str]) {
        *self.expired_override.lock().unwrap() = Some(ids.iter().map(|s| s.to_string()).collect());
    }

    /// Make `find_activity` fail for this id.
    pub fn fail_on(&self, workspace_id: &str) {
        self.failing.lock().unwrap().insert(workspace_id.to_string());
    }

    pub fn calls(&self) -> Vec<DaoCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn writes(&self) -> Vec<DaoCall> {
        self.calls().into_iter().filter(DaoCall::is_write).collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn log(&self, call: DaoCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn update(&self, workspace_id: &str, apply: impl FnOnce(&mut WorkspaceActivity)) {
        let mut records = self.records.lock().unwrap();
        let record = records
            .entry(workspace_id.to_string())
            .or_insert_with(|| WorkspaceActivity::new(workspace_id));
        apply(record);
    }
}

#[async_trait::async_trait]
impl WorkspaceActivityDao for RecordingDao {
    async fn find_expired(&self, timestamp: i64) -> ws_activity::Result<Vec<String>> {
        self.log(DaoCall::FindExpired(timestamp));
        if let Some(ids) = self.expired_override.lock().unwrap().clone() {
            return Ok(ids);
        }
        let mut expired: Vec<String> = self
            .records
            .lock()
            .unwrap()
            .values()
            .filter(|a| a.expiration.is_some_and(|e| e <= timestamp))
            .map(|a| a.workspace_id.clone())
            .collect();
        expired.sort();
        Ok(expired)
    }

    async fn remove_expiration(&self, workspace_id: &str) -> ws_activity::Result<()> {
        self.log(DaoCall::RemoveExpiration(workspace_id.to_string()));
        self.journal
            .lock()
            .unwrap()
            .push(format!("remove_expiration:{}", workspace_id));
        if let Some(record) = self.records.lock().unwrap().get_mut(workspace_id) {
            record.expiration = None;
        }
        Ok(())
    }

    async fn set_expiration_time(&self, workspace_id: &str, expiration: i64) -> ws_activity::Result<()> {
        self.log(DaoCall::SetExpirationTime(workspace_id.to_string(), expiration));
        self.update(workspace_id, |a| a.expiration = Some(expiration));
        Ok(())
    }

    async fn find_activity(&self, workspace_id: &str) -> ws_activity::Result<Option<WorkspaceActivity>> {
        self.log(DaoCall::FindActivity(workspace_id.to_string()));
        if self.failing.lock().unwrap().contains(workspace_id) {
            return Err(ActivityError::InvalidState(format!(
                "injected failure for {}",
                workspace_id
            )));
        }
        Ok(self.record(workspace_id))
    }

    async fn create_activity(&self, activity: &WorkspaceActivity) -> ws_activity::Result<()> {
        self.log(DaoCall::CreateActivity(activity.clone()));
        self.insert(activity.clone());
        Ok(())
    }

    async fn set_created_time(&self, workspace_id: &str, created: i64) -> ws_activity::Result<()> {
        self.log(DaoCall::SetCreatedTime(workspace_id.to_string(), created));
        self.update(workspace_id, |a| a.created = Some(created));
        Ok(())
    }

    async fn set_status_change_time(
        &self,
        workspace_id: &str,
        status: WorkspaceStatus,
        time: i64,
    ) -> ws_activity::Result<()> {
        self.log(DaoCall::SetStatusChangeTime(workspace_id.to_string(), status, time));
        self.update(workspace_id, |a| a.set_status_change_time(status, time));
        Ok(())
    }

    async fn remove_activity(&self, workspace_id: &str) -> ws_activity::Result<()> {
        self.log(DaoCall::RemoveActivity(workspace_id.to_string()));
        self.records.lock().unwrap().remove(workspace_id);
        Ok(())
    }
}

/// Fake workspace master: tracks running workspaces and their attributes.
#[derive(Default)]
pub struct FakeWorkspaces {
    running: Mutex<HashSet<String>>,
    workspaces: Mutex<HashMap<String, WorkspaceInfo>>,
    stopped: Mutex<Vec<String>>,
    fail_stop: bool,
    fail_running: bool,
    journal: Journal,
}

impl FakeWorkspaces {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_journal(journal: Journal) -> Arc<Self> {
        Arc::new(Self {
            journal,
            ..Default::default()
        })
    }

    pub fn failing_stops(journal: Journal) -> Arc<Self> {
        Arc::new(Self {
            fail_stop: true,
            journal,
            ..Default::default()
        })
    }

    pub fn failing_runtime_query() -> Arc<Self> {
        Arc::new(Self {
            fail_running: true,
            ..Default::default()
        })
    }

    /// Register a running workspace with the given `created` attribute.
    pub fn add_running(&self, workspace_id: &str, created: Option<&str>) {
        let mut attributes = HashMap::new();
        if let Some(created) = created {
            attributes.insert(CREATED_ATTRIBUTE_NAME.to_string(), created.to_string());
        }
        self.workspaces.lock().unwrap().insert(
            workspace_id.to_string(),
            WorkspaceInfo {
                id: workspace_id.to_string(),
                attributes,
            },
        );
        self.running.lock().unwrap().insert(workspace_id.to_string());
    }

    pub fn stopped(&self) -> Vec<String> {
        self.stopped.lock().unwrap().clone()
    }

    pub fn is_running(&self, workspace_id: &str) -> bool {
        self.running.lock().unwrap().contains(workspace_id)
    }
}

#[async_trait::async_trait]
impl WorkspaceRuntimes for FakeWorkspaces {
    async fn running(&self) -> anyhow::Result<HashSet<String>> {
        if self.fail_running {
            anyhow::bail!("runtime layer unavailable");
        }
        Ok(self.running.lock().unwrap().clone())
    }
}

#[async_trait::async_trait]
impl WorkspaceManager for FakeWorkspaces {
    async fn get_workspace(&self, workspace_id: &str) -> anyhow::Result<WorkspaceInfo> {
        self.workspaces
            .lock()
            .unwrap()
            .get(workspace_id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Workspace {} not found", workspace_id))
    }

    async fn stop_workspace(&self, workspace_id: &str) -> anyhow::Result<()> {
        self.journal
            .lock()
            .unwrap()
            .push(format!("stop:{}", workspace_id));
        if self.fail_stop {
            anyhow::bail!("workspace {} is not running", workspace_id);
        }
        self.stopped.lock().unwrap().push(workspace_id.to_string());
        self.running.lock().unwrap().remove(workspace_id);
        Ok(())
    }
}
