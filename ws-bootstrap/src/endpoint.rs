use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Path under the websocket base where installers push statuses.
pub const INSTALLER_WEBSOCKET_ENDPOINT_BASE: &str = "/installer/websocket/";

/// Path under the websocket base where installers push their logs.
pub const OUTPUT_WEBSOCKET_ENDPOINT_BASE: &str = "/output/websocket/";

/// Monotonic source of endpoint ids.
///
/// Clones share the same counter, so every bootstrapper built from one
/// factory gets ids that never collide with a concurrent attempt.
#[derive(Debug, Clone, Default)]
pub struct EndpointIds {
    next: Arc<AtomicU64>,
}

impl EndpointIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> u64 {
        self.next.fetch_add(1, Ordering::SeqCst)
    }
}

/// Endpoints handed to the installer agents of one bootstrap attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapEndpoints {
    pub installer: String,
    pub output: String,
}

impl BootstrapEndpoints {
    /// Allocate a fresh pair of endpoints under `websocket_base`.
    pub fn allocate(websocket_base: &str, ids: &EndpointIds) -> Self {
        let base = websocket_base.trim_end_matches('/');
        Self {
            installer: format!("{}{}{}", base, INSTALLER_WEBSOCKET_ENDPOINT_BASE, ids.next_id()),
            output: format!("{}{}{}", base, OUTPUT_WEBSOCKET_ENDPOINT_BASE, ids.next_id()),
        }
    }
}
