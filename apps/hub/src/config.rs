use std::time::Duration;
use std::{fmt, path};

pub use config_loader::ConfigError;
use serde::{Deserialize, Serialize};

use crate::hub::DEFAULT_REWARD_PER_TICK;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: Server,
    pub database: Database,
    pub scheduler: Scheduler,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Server {
    /// Address the validator websocket listener binds to
    pub listen: String,
    /// Frames queued per connection before sends start failing
    pub outbound_queue: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Database {
    pub path: String,
    pub pool_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Scheduler {
    pub probe_interval_secs: u64,
    pub reward_per_tick: i64,
    /// How long an unanswered probe keeps its callback entry
    pub callback_ttl_secs: u64,
    pub sweep_interval_secs: u64,
}

impl Default for Server {
    fn default() -> Self {
        Self { listen: "0.0.0.0:8081".into(), outbound_queue: 256 }
    }
}

impl Default for Database {
    fn default() -> Self {
        Self { path: "sentinel.db".into(), pool_size: 8 }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self {
            probe_interval_secs: 20,
            reward_per_tick: DEFAULT_REWARD_PER_TICK,
            callback_ttl_secs: 120,
            sweep_interval_secs: 30,
        }
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let write_1 = |f: &mut fmt::Formatter<'_>, label: &str, value: &dyn fmt::Display| {
            writeln!(f, "    {}: {}", label, value)
        };

        writeln!(f, "Current Hub Configuration:")?;
        writeln!(f, "  Server")?;
        write_1(f, "Listen Address", &self.server.listen)?;
        write_1(f, "Outbound Queue", &self.server.outbound_queue)?;
        writeln!(f, "  Database")?;
        write_1(f, "Path", &self.database.path)?;
        write_1(f, "Pool Size", &self.database.pool_size)?;
        writeln!(f, "  Scheduler")?;
        write_1(f, "Probe Interval (s)", &self.scheduler.probe_interval_secs)?;
        write_1(f, "Reward Per Tick", &self.scheduler.reward_per_tick)?;
        write_1(f, "Callback TTL (s)", &self.scheduler.callback_ttl_secs)?;
        write_1(f, "Sweep Interval (s)", &self.scheduler.sweep_interval_secs)?;

        Ok(())
    }
}

impl Config {
    /// Load the config at `optional_path`, or at
    /// `$XDG_CONFIG_HOME/sentinel/hub.toml`, writing defaults if missing
    pub fn from_config(optional_path: Option<impl AsRef<path::Path>>) -> Result<Self, ConfigError> {
        config_loader::load_or_init(optional_path, "hub.toml")
    }

    pub fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.scheduler.probe_interval_secs.max(1))
    }

    pub fn callback_ttl(&self) -> Duration {
        Duration::from_secs(self.scheduler.callback_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.scheduler.sweep_interval_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/hub");

        let config = Config::from_config(Some(&path)).unwrap();
        assert_eq!(config.scheduler.probe_interval_secs, 20);
        assert_eq!(config.scheduler.reward_per_tick, 100);
        assert!(dir.path().join("nested/hub.toml").exists());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hub.toml");
        fs::write(&path, "[scheduler]\nprobe_interval_secs = 5\n").unwrap();

        let config = Config::from_config(Some(&path)).unwrap();
        assert_eq!(config.probe_interval(), Duration::from_secs(5));
        assert_eq!(config.server.listen, "0.0.0.0:8081");
        assert_eq!(config.callback_ttl(), Duration::from_secs(120));
    }

    #[test]
    fn test_invalid_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hub.toml");
        fs::write(&path, "[scheduler\n").unwrap();

        assert!(matches!(Config::from_config(Some(&path)), Err(ConfigError::ParseFailed(_))));
    }

    #[test]
    fn test_display_lists_interval() {
        let rendered = Config::default().to_string();
        assert!(rendered.contains("Probe Interval (s): 20"));
    }
}
