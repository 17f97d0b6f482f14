//! TOML config files under `$XDG_CONFIG_HOME/sentinel/`, written with
//! defaults on first use.

use std::{env, fs, io, path};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadFailed(#[source] io::Error),
    #[error("failed to write config file: {0}")]
    WriteFailed(#[source] io::Error),
    #[error("failed to parse config file: {0}")]
    ParseFailed(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    SerializeFailed(#[from] toml::ser::Error),
    #[error("no config path given and no home directory to derive one from")]
    ConfigPathUnavailable,
}

/// Used to ensure we are actually reading a toml file
fn normalize_toml_path(path: &path::Path) -> path::PathBuf {
    let mut path = path.to_path_buf();
    if path.extension().map(|ext| ext != "toml").unwrap_or(true) {
        path.set_extension("toml");
    }
    path
}

/// $XDG_CONFIG_HOME/sentinel/<file_name>, or $HOME/.config/...
fn default_config_path(file_name: &str) -> Result<path::PathBuf, ConfigError> {
    let path = if let Ok(config_home) = env::var("XDG_CONFIG_HOME") {
        path::PathBuf::from(config_home)
    } else if let Some(home_dir) = env::home_dir() {
        home_dir.join(".config")
    } else {
        return Err(ConfigError::ConfigPathUnavailable);
    };

    Ok(path.join("sentinel").join(file_name))
}

/// Read the config at `optional_path`, or at the default location for
/// `file_name`. A missing file is created holding `T::default()`.
pub fn load_or_init<T>(
    optional_path: Option<impl AsRef<path::Path>>,
    file_name: &str,
) -> Result<T, ConfigError>
where
    T: Serialize + DeserializeOwned + Default,
{
    let config_path = match optional_path {
        Some(path) => normalize_toml_path(path.as_ref()),
        None => default_config_path(file_name)?,
    };

    if config_path.exists() {
        let raw_string = fs::read_to_string(&config_path).map_err(ConfigError::ReadFailed)?;
        return Ok(toml::from_str(&raw_string)?);
    }

    let config = T::default();
    write_config(&config, &config_path)?;
    Ok(config)
}

/// Serialize and write a config to a file
pub fn write_config<T: Serialize>(config: &T, path: &path::Path) -> Result<(), ConfigError> {
    let config_str = toml::to_string_pretty(config)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(ConfigError::WriteFailed)?;
    }

    fs::write(path, config_str).map_err(ConfigError::WriteFailed)
}
