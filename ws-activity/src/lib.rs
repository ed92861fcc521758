//! Workspace activity tracking
//!
//! Persists one activity record per workspace and keeps the idle expiration
//! of running workspaces correct. [`WorkspaceActivityManager`] records status
//! transitions and user activity as they happen; [`WorkspaceActivityChecker`]
//! runs periodically to stop expired workspaces and repair records that went
//! missing or stale.

pub mod activity;
pub mod checker;
pub mod dao;
pub mod db;
pub mod error;
pub mod manager;
pub mod sqlite;
pub mod workspace;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use activity::WorkspaceActivity;
pub use checker::{ExpiryOrdering, WorkspaceActivityChecker};
pub use dao::WorkspaceActivityDao;
pub use error::{ActivityError, Result};
pub use manager::WorkspaceActivityManager;
pub use sqlite::SqliteActivityDao;
pub use workspace::{WorkspaceInfo, WorkspaceManager, WorkspaceRuntimes, CREATED_ATTRIBUTE_NAME};
