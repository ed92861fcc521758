use crate::config::Config;
use sqlx::SqlitePool;
use std::sync::Arc;
use ws_activity::{SqliteActivityDao, WorkspaceActivityManager};
use ws_bootstrap::BootstrapperFactory;
use ws_core::{BootstrapStatusEvent, Clock, EventService, SystemClock, WorkspaceStatusEvent};

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub activity_manager: WorkspaceActivityManager,
    pub workspace_events: Arc<EventService<WorkspaceStatusEvent>>,
    pub bootstrapper_factory: BootstrapperFactory,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: &Config) -> Self {
        Self::with_clock(pool, config, Arc::new(SystemClock))
    }

    pub fn with_clock(pool: SqlitePool, config: &Config, clock: Arc<dyn Clock>) -> Self {
        let dao = Arc::new(SqliteActivityDao::new(pool.clone()));
        let activity_manager =
            WorkspaceActivityManager::new(dao, config.idle_timeout_ms, Arc::clone(&clock));
        let bootstrapper_factory = BootstrapperFactory::new(
            Arc::new(EventService::new()),
            config.endpoint_base.clone(),
            config.bootstrap_timeout_minutes,
        );

        Self {
            pool,
            activity_manager,
            workspace_events: Arc::new(EventService::new()),
            bootstrapper_factory,
            clock,
        }
    }

    /// Bus the installer agents report bootstrap progress on.
    pub fn bootstrap_events(&self) -> &Arc<EventService<BootstrapStatusEvent>> {
        self.bootstrapper_factory.event_service()
    }
}
