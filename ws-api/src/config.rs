use serde::{Deserialize, Deserializer};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::warn;
use ws_activity::ExpiryOrdering;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    #[serde(default = "default_workspace_master_url")]
    pub workspace_master_url: String,

    /// Idle time in milliseconds before a running workspace is stopped
    #[serde(
        default = "default_idle_timeout",
        deserialize_with = "deserialize_idle_timeout"
    )]
    pub idle_timeout_ms: i64,

    #[serde(default = "default_bootstrap_timeout")]
    pub bootstrap_timeout_minutes: u64,

    #[serde(default = "default_activity_check_interval")]
    pub activity_check_interval_secs: u64,

    #[serde(default = "default_expiry_ordering")]
    pub expiry_ordering: ExpiryOrdering,

    /// Websocket base that installer and output endpoints are derived from
    #[serde(default = "default_endpoint_base")]
    pub endpoint_base: String,
}

const DEFAULT_IDLE_TIMEOUT_MS: i64 = 3_600_000; // 1 hour

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, "Ignoring unparsable configuration value");
            default
        }),
        Err(_) => default,
    }
}

fn default_bind_addr() -> String {
    std::env::var("WS_API_BIND").unwrap_or_else(|_| "0.0.0.0:3122".to_string())
}

fn default_db_path() -> PathBuf {
    if let Ok(path) = std::env::var("WS_API_DB_PATH") {
        return PathBuf::from(path);
    }

    if cfg!(windows) {
        let appdata = std::env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(appdata).join("ws").join("api").join("activity.db")
    } else {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".ws").join("api").join("activity.db")
    }
}

fn default_workspace_master_url() -> String {
    std::env::var("WS_API_WORKSPACE_MASTER_URL")
        .unwrap_or_else(|_| "http://localhost:8080".to_string())
}

fn default_idle_timeout() -> i64 {
    let idle_timeout = env_or("WS_API_IDLE_TIMEOUT_MS", DEFAULT_IDLE_TIMEOUT_MS);
    if idle_timeout <= 0 {
        warn!(idle_timeout, "Idle timeout must be positive, using the default");
        return DEFAULT_IDLE_TIMEOUT_MS;
    }
    idle_timeout
}

fn deserialize_idle_timeout<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let idle_timeout = i64::deserialize(deserializer)?;
    if idle_timeout <= 0 {
        return Err(serde::de::Error::custom(format!(
            "idle_timeout_ms must be positive, got {}",
            idle_timeout
        )));
    }
    Ok(idle_timeout)
}

fn default_bootstrap_timeout() -> u64 {
    env_or("WS_API_BOOTSTRAP_TIMEOUT_MINUTES", 10)
}

fn default_activity_check_interval() -> u64 {
    env_or("WS_API_ACTIVITY_CHECK_INTERVAL", 60) // 1 minute
}

fn default_expiry_ordering() -> ExpiryOrdering {
    env_or("WS_API_EXPIRY_ORDERING", ExpiryOrdering::default())
}

fn default_endpoint_base() -> String {
    std::env::var("WS_API_ENDPOINT_BASE").unwrap_or_else(|_| "ws://localhost:3122".to_string())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            db_path: default_db_path(),
            workspace_master_url: default_workspace_master_url(),
            idle_timeout_ms: default_idle_timeout(),
            bootstrap_timeout_minutes: default_bootstrap_timeout(),
            activity_check_interval_secs: default_activity_check_interval(),
            expiry_ordering: default_expiry_ordering(),
            endpoint_base: default_endpoint_base(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}
