use std::{fmt, path};

pub use config_loader::ConfigError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: Server,
    pub database: Database,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Server {
    pub listen: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Database {
    /// Same file the hub writes to
    pub path: String,
    pub pool_size: usize,
}

impl Default for Server {
    fn default() -> Self {
        Self { listen: "0.0.0.0:8080".into() }
    }
}

impl Default for Database {
    fn default() -> Self {
        Self { path: "sentinel.db".into(), pool_size: 8 }
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Current API Configuration:")?;
        writeln!(f, "  Listen Address: {}", self.server.listen)?;
        writeln!(f, "  Database Path: {}", self.database.path)?;
        write!(f, "  Pool Size: {}", self.database.pool_size)
    }
}

impl Config {
    /// Load the config at `optional_path`, or at
    /// `$XDG_CONFIG_HOME/sentinel/api.toml`, writing defaults if missing
    pub fn from_config(optional_path: Option<impl AsRef<path::Path>>) -> Result<Self, ConfigError> {
        config_loader::load_or_init(optional_path, "api.toml")
    }
}
