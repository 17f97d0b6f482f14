use std::time::Duration;
use std::{fmt, path};

pub use config_loader::ConfigError;
use sentinel::probe::DEFAULT_PROBE_TIMEOUT_MS;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub hub: Hub,
    pub node: Node,
    pub reconnect: Reconnect,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Hub {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Node {
    /// Address reported to the hub at signup
    pub ip: String,
    pub probe_timeout_ms: u64,
    /// 32-byte secret key file, used when SENTINEL_PRIVATE_KEY is unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_file: Option<path::PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Reconnect {
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for Hub {
    fn default() -> Self {
        Self { url: "ws://127.0.0.1:8081".into() }
    }
}

impl Default for Node {
    fn default() -> Self {
        Self { ip: "127.0.0.1".into(), probe_timeout_ms: DEFAULT_PROBE_TIMEOUT_MS, key_file: None }
    }
}

impl Default for Reconnect {
    fn default() -> Self {
        Self { initial_delay_ms: 1000, max_delay_ms: 60_000 }
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Current Validator Configuration:")?;
        writeln!(f, "  Hub URL: {}", self.hub.url)?;
        writeln!(f, "  Advertised IP: {}", self.node.ip)?;
        writeln!(f, "  Probe Timeout (ms): {}", self.node.probe_timeout_ms)?;
        match &self.node.key_file {
            Some(path) => writeln!(f, "  Key File: {}", path.display())?,
            None => writeln!(f, "  Key File: (none)")?,
        }
        writeln!(
            f,
            "  Reconnect Backoff (ms): {}..{}",
            self.reconnect.initial_delay_ms, self.reconnect.max_delay_ms
        )
    }
}

impl Config {
    /// Load the config at `optional_path`, or at
    /// `$XDG_CONFIG_HOME/sentinel/validator.toml`, writing defaults if missing
    pub fn from_config(optional_path: Option<impl AsRef<path::Path>>) -> Result<Self, ConfigError> {
        config_loader::load_or_init(optional_path, "validator.toml")
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.node.probe_timeout_ms)
    }

    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.reconnect.initial_delay_ms.max(1))
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.reconnect.max_delay_ms.max(self.reconnect.initial_delay_ms))
    }
}
