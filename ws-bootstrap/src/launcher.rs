use crate::endpoint::BootstrapEndpoints;
use anyhow::Result;

/// Starts the installer agents inside a machine.
///
/// Implementations are infrastructure specific (exec into a container,
/// a pod, ...). `launch` should return once the agents have been started;
/// completion is reported separately through bootstrap status events.
#[async_trait::async_trait]
pub trait BootstrapLauncher: Send + Sync {
    /// Start bootstrapping. An error means the agents could not be started.
    async fn launch(&self, endpoints: &BootstrapEndpoints) -> Result<()>;
}
