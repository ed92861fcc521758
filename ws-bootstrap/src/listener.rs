use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::oneshot;
use tracing::debug;
use ws_core::{BootstrapStatusEvent, EventSubscriber, RuntimeIdentity};

/// Resolves a single completion slot with the first terminal status event
/// of one (runtime, machine) pair.
#[derive(Debug)]
pub struct BootstrapperStatusListener {
    runtime_id: RuntimeIdentity,
    machine_name: String,
    slot: Mutex<Option<oneshot::Sender<BootstrapStatusEvent>>>,
}

impl BootstrapperStatusListener {
    pub fn new(
        runtime_id: RuntimeIdentity,
        machine_name: impl Into<String>,
    ) -> (Arc<Self>, oneshot::Receiver<BootstrapStatusEvent>) {
        let (sender, receiver) = oneshot::channel();
        let listener = Self {
            runtime_id,
            machine_name: machine_name.into(),
            slot: Mutex::new(Some(sender)),
        };
        (Arc::new(listener), receiver)
    }

    /// True for DONE/FAILED events of this listener's runtime and machine.
    pub fn accepts(&self, event: &BootstrapStatusEvent) -> bool {
        event.status.is_terminal()
            && event.machine_name == self.machine_name
            && event.runtime_id == self.runtime_id
    }

    pub fn is_resolved(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

impl EventSubscriber<BootstrapStatusEvent> for BootstrapperStatusListener {
    fn on_event(&self, event: &BootstrapStatusEvent) {
        if !self.accepts(event) {
            return;
        }

        let sender = self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        match sender {
            Some(sender) => {
                debug!(
                    machine = %self.machine_name,
                    status = ?event.status,
                    "Received terminal bootstrapper status"
                );
                // The waiter may already have given up; nothing to do then.
                let _ = sender.send(event.clone());
            }
            None => debug!(
                machine = %self.machine_name,
                status = ?event.status,
                "Ignoring bootstrapper status, already resolved"
            ),
        }
    }
}
