use crate::endpoint::{BootstrapEndpoints, EndpointIds};
use crate::error::{BootstrapError, Result};
use crate::launcher::BootstrapLauncher;
use crate::listener::BootstrapperStatusListener;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};
use ws_core::{BootstrapStatusEvent, BootstrapperStatus, EventService, RuntimeIdentity};

/// Bootstraps the installers of one machine and waits for them to finish.
///
/// An instance owns exactly one completion slot, so [`Bootstrapper::bootstrap`]
/// may be called once. Use [`crate::BootstrapperFactory`] to get instances that
/// share an endpoint id counter.
pub struct Bootstrapper {
    machine_name: String,
    runtime_id: RuntimeIdentity,
    timeout: Duration,
    websocket_base: String,
    endpoint_ids: EndpointIds,
    event_service: Arc<EventService<BootstrapStatusEvent>>,
    launcher: Arc<dyn BootstrapLauncher>,
    cancellation: CancellationToken,
    started: AtomicBool,
}

impl Bootstrapper {
    pub fn new(
        machine_name: impl Into<String>,
        runtime_id: RuntimeIdentity,
        timeout_minutes: u64,
        websocket_base: impl Into<String>,
        endpoint_ids: EndpointIds,
        event_service: Arc<EventService<BootstrapStatusEvent>>,
        launcher: Arc<dyn BootstrapLauncher>,
    ) -> Self {
        Self {
            machine_name: machine_name.into(),
            runtime_id,
            timeout: Duration::from_secs(timeout_minutes.saturating_mul(60)),
            websocket_base: websocket_base.into(),
            endpoint_ids,
            event_service,
            launcher,
            cancellation: CancellationToken::new(),
            started: AtomicBool::new(false),
        }
    }

    /// Cancelling `token` interrupts a pending [`Bootstrapper::bootstrap`].
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn machine_name(&self) -> &str {
        &self.machine_name
    }

    pub fn runtime_id(&self) -> &RuntimeIdentity {
        &self.runtime_id
    }

    /// Bootstraps installers and waits until they report DONE.
    ///
    /// # Errors
    /// - [`BootstrapError::IllegalUsage`] when called a second time
    /// - [`BootstrapError::Launch`] when the installers could not be launched
    /// - [`BootstrapError::Failed`] when the installers reported FAILED
    /// - [`BootstrapError::Timeout`] when no terminal status arrived in time
    /// - [`BootstrapError::Interrupted`] when the cancellation token fired
    #[instrument(
        skip(self),
        fields(machine = %self.machine_name, workspace_id = %self.runtime_id.workspace_id)
    )]
    pub async fn bootstrap(&self) -> Result<()> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(BootstrapError::IllegalUsage(
                "Bootstrap method must be called only once".to_string(),
            ));
        }

        let (listener, finished) =
            BootstrapperStatusListener::new(self.runtime_id.clone(), self.machine_name.clone());
        // Unsubscribed when this guard drops, on every return path.
        let _subscription = self.event_service.subscribe(listener);

        let endpoints = BootstrapEndpoints::allocate(&self.websocket_base, &self.endpoint_ids);
        info!(installer_endpoint = %endpoints.installer, "Launching bootstrapper");

        let event = tokio::select! {
            biased;
            _ = self.cancellation.cancelled() => {
                warn!("Bootstrapping interrupted");
                return Err(self.interrupted());
            }
            waited = tokio::time::timeout(self.timeout, self.launch_and_wait(&endpoints, finished)) => {
                match waited {
                    Ok(result) => result?,
                    Err(_) => {
                        warn!(timeout_secs = self.timeout.as_secs(), "Bootstrapping timed out");
                        return Err(BootstrapError::Timeout {
                            machine: self.machine_name.clone(),
                        });
                    }
                }
            }
        };

        match event.status {
            BootstrapperStatus::Failed => Err(BootstrapError::Failed(event.error.unwrap_or_else(
                || format!("Bootstrapping of machine {} failed", self.machine_name),
            ))),
            _ => {
                info!("Bootstrapping finished");
                Ok(())
            }
        }
    }

    async fn launch_and_wait(
        &self,
        endpoints: &BootstrapEndpoints,
        mut finished: oneshot::Receiver<BootstrapStatusEvent>,
    ) -> Result<BootstrapStatusEvent> {
        let mut launch = self.launcher.launch(endpoints);
        let mut launched = false;

        loop {
            tokio::select! {
                biased;
                event = &mut finished => {
                    // The sender only disappears if the listener is torn down early.
                    return event.map_err(|_| self.interrupted());
                }
                result = &mut launch, if !launched => {
                    launched = true;
                    if let Err(source) = result {
                        // A terminal status published before the launcher failed still counts
                        if let Ok(event) = finished.try_recv() {
                            warn!(error = %source, "Launcher failed after bootstrapping finished");
                            return Ok(event);
                        }
                        return Err(BootstrapError::Launch {
                            machine: self.machine_name.clone(),
                            source,
                        });
                    }
                    info!("Launched bootstrapper, waiting for terminal status");
                }
            }
        }
    }

    fn interrupted(&self) -> BootstrapError {
        BootstrapError::Interrupted {
            machine: self.machine_name.clone(),
        }
    }
}

impl std::fmt::Debug for Bootstrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bootstrapper")
            .field("machine_name", &self.machine_name)
            .field("runtime_id", &self.runtime_id)
            .field("timeout", &self.timeout)
            .field("started", &self.started.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}
