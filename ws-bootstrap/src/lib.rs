//! Installer bootstrap coordination
//!
//! A [`Bootstrapper`] pushes installer agents into one machine of a workspace
//! runtime and waits until the agents report a terminal status over the
//! shared bootstrap event bus, or until the configured timeout elapses.

pub mod bootstrapper;
pub mod endpoint;
pub mod error;
pub mod factory;
pub mod launcher;
pub mod listener;

pub use bootstrapper::Bootstrapper;
pub use endpoint::{BootstrapEndpoints, EndpointIds};
pub use error::{BootstrapError, Result};
pub use factory::BootstrapperFactory;
pub use launcher::BootstrapLauncher;
pub use listener::BootstrapperStatusListener;
