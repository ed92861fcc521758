//! Tracing initialization for the workspace services
//!
//! Filtering uses the standard `RUST_LOG` variable
//! (`RUST_LOG=ws_api=debug,ws_activity=info`), output format comes from
//! `RUST_LOG_FORMAT`:
//! - `json` - JSON formatted output
//! - `compact` - Compact single-line output
//! - `pretty` - Pretty formatted output (default)

use crate::error::{CoreError, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize with a default filter used when `RUST_LOG` is not set
pub fn init_with_defaults(default_filter: &str) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let registry = tracing_subscriber::registry().with(env_filter);
    let result = match format.as_str() {
        "json" => registry.with(fmt::layer().with_ansi(false).json()).try_init(),
        "compact" => registry.with(fmt::layer().compact()).try_init(),
        _ => registry.with(fmt::layer().pretty()).try_init(),
    };

    result.map_err(|e| CoreError::Internal(format!("Failed to initialize tracing: {}", e)))
}

/// Initialize for testing with a specific configuration
#[cfg(any(test, feature = "test-utils"))]
pub fn init_for_testing() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::new("debug"))
        .with(fmt::layer().with_test_writer())
        .try_init()
        .map_err(|e| CoreError::Internal(format!("Failed to initialize test tracing: {}", e)))
}
