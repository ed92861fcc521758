use crate::bootstrapper::Bootstrapper;
use crate::endpoint::EndpointIds;
use crate::launcher::BootstrapLauncher;
use std::sync::Arc;
use ws_core::{BootstrapStatusEvent, EventService, RuntimeIdentity};

/// Builds bootstrappers that share one event bus, one timeout and one
/// endpoint id counter.
#[derive(Debug, Clone)]
pub struct BootstrapperFactory {
    event_service: Arc<EventService<BootstrapStatusEvent>>,
    websocket_base: String,
    timeout_minutes: u64,
    endpoint_ids: EndpointIds,
}

impl BootstrapperFactory {
    pub fn new(
        event_service: Arc<EventService<BootstrapStatusEvent>>,
        websocket_base: impl Into<String>,
        timeout_minutes: u64,
    ) -> Self {
        Self {
            event_service,
            websocket_base: websocket_base.into(),
            timeout_minutes,
            endpoint_ids: EndpointIds::new(),
        }
    }

    pub fn create(
        &self,
        machine_name: impl Into<String>,
        runtime_id: RuntimeIdentity,
        launcher: Arc<dyn BootstrapLauncher>,
    ) -> Bootstrapper {
        Bootstrapper::new(
            machine_name,
            runtime_id,
            self.timeout_minutes,
            self.websocket_base.clone(),
            self.endpoint_ids.clone(),
            Arc::clone(&self.event_service),
            launcher,
        )
    }

    pub fn event_service(&self) -> &Arc<EventService<BootstrapStatusEvent>> {
        &self.event_service
    }
}
