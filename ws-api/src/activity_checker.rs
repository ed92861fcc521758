use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::info;
use ws_activity::WorkspaceActivityChecker;

/// Run the activity checker every `period` until the task is aborted.
///
/// Ticks run one after another on this task, so passes never overlap.
pub async fn start_activity_checker_task(checker: Arc<WorkspaceActivityChecker>, period: Duration) {
    let mut interval = interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(
        "Activity checker running (checks every {} ms)",
        period.as_millis()
    );

    loop {
        interval.tick().await;
        checker.validate().await;
    }
}
