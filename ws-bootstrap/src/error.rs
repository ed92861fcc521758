use thiserror::Error;

pub type Result<T> = std::result::Result<T, BootstrapError>;

#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("Bootstrapping failed: {0}")]
    Failed(String),

    #[error("Bootstrapping of machine {machine} reached timeout")]
    Timeout { machine: String },

    #[error("Bootstrapping of machine {machine} was interrupted")]
    Interrupted { machine: String },

    #[error("Illegal usage: {0}")]
    IllegalUsage(String),

    #[error("Failed to launch bootstrapper for machine {machine}: {source}")]
    Launch {
        machine: String,
        #[source]
        source: anyhow::Error,
    },
}
