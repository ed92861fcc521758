use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use tracing::{debug, info};
use ws_core::{BootstrapStatusEvent, WorkspaceStatusEvent};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/bootstrapper/events", post(publish_bootstrap_event))
        .route("/api/v1/workspaces/events", post(publish_workspace_event))
}

/// Installer agents report their progress here.
async fn publish_bootstrap_event(
    State(state): State<AppState>,
    Json(event): Json<BootstrapStatusEvent>,
) -> StatusCode {
    info!(
        workspace_id = %event.runtime_id.workspace_id,
        machine = %event.machine_name,
        status = ?event.status,
        "Bootstrapper status reported"
    );
    state.bootstrap_events().publish(&event);

    StatusCode::ACCEPTED
}

async fn publish_workspace_event(
    State(state): State<AppState>,
    Json(event): Json<WorkspaceStatusEvent>,
) -> StatusCode {
    debug!(
        workspace_id = %event.workspace_id,
        status = %event.status,
        "Workspace status reported"
    );
    state.workspace_events.publish(&event);

    StatusCode::ACCEPTED
}
