use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::put,
    Router,
};
use tracing::debug;
use ws_core::Clock;

pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/api/v1/activity/{workspace_id}",
        put(record_activity).delete(remove_activity),
    )
}

fn validate_workspace_id(workspace_id: &str) -> ApiResult<()> {
    if workspace_id.trim().is_empty() {
        return Err(ApiError::BadRequest("Workspace id must not be blank".to_string()));
    }
    Ok(())
}

/// User activity ping: pushes the idle expiration of the workspace out.
async fn record_activity(
    State(state): State<AppState>,
    Path(workspace_id): Path<String>,
) -> ApiResult<StatusCode> {
    validate_workspace_id(&workspace_id)?;

    let now = state.clock.now_millis();
    debug!(workspace_id = %workspace_id, "Activity ping");
    state.activity_manager.update(&workspace_id, now).await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn remove_activity(
    State(state): State<AppState>,
    Path(workspace_id): Path<String>,
) -> ApiResult<StatusCode> {
    validate_workspace_id(&workspace_id)?;

    state.activity_manager.remove_activity(&workspace_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
