use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use ws_activity::db::{open_activity_store, snapshot_activity_store};
use ws_activity::{SqliteActivityDao, WorkspaceActivityChecker};
use ws_api::{create_app, start_activity_checker_task, AppState, Config, WorkspaceMasterClient};
use ws_core::{Clock, SystemClock};

#[tokio::main]
async fn main() -> Result<()> {
    ws_core::tracing_init::init_with_defaults(
        "ws_api=debug,ws_activity=debug,ws_bootstrap=debug,tower_http=debug",
    )?;

    info!("Starting ws-api service...");

    // Load configuration
    let config = Config::from_env();
    info!(
        "Configuration loaded: bind_addr={}, db_path={}, workspace_master_url={}",
        config.bind_addr,
        config.db_path.display(),
        config.workspace_master_url
    );

    // Keep a copy of the store before migrations touch it
    let taken_at = SystemClock.now_millis();
    if let Some(snapshot) = snapshot_activity_store(&config.db_path, taken_at)? {
        info!("Activity store copied to: {}", snapshot.display());
    }

    let pool = open_activity_store(&config.db_path).await?;

    let state = AppState::new(pool.clone(), &config);

    // Record workspace status transitions as they are reported
    state
        .activity_manager
        .spawn_status_listener(&state.workspace_events);

    // Start activity checker task
    let master = Arc::new(WorkspaceMasterClient::new(&config.workspace_master_url)?);
    let checker = WorkspaceActivityChecker::new(
        Arc::new(SqliteActivityDao::new(pool)),
        master.clone(),
        master,
        state.activity_manager.clone(),
        Arc::clone(&state.clock),
    )
    .with_expiry_ordering(config.expiry_ordering);
    tokio::spawn(start_activity_checker_task(
        Arc::new(checker),
        Duration::from_secs(config.activity_check_interval_secs.max(1)),
    ));
    info!(
        "Activity checker started (interval: {}s, idle timeout: {}ms, ordering: {:?})",
        config.activity_check_interval_secs, config.idle_timeout_ms, config.expiry_ordering
    );

    let app = create_app(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Listening on http://{}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
