//! Shared building blocks for workspace runtime coordination
//!
//! Identity and event types that cross crate boundaries, the injectable
//! clock, the in-process event bus and tracing setup.

pub mod clock;
pub mod error;
pub mod event;
pub mod identity;
pub mod status;
pub mod tracing_init;

pub use clock::{Clock, SystemClock};
pub use error::{CoreError, Result};
pub use event::{ChannelSubscriber, EventService, EventSubscriber, Subscription};
pub use identity::{BootstrapStatusEvent, BootstrapperStatus, RuntimeIdentity};
pub use status::{WorkspaceStatus, WorkspaceStatusEvent};

#[cfg(any(test, feature = "test-utils"))]
pub use clock::ManualClock;
