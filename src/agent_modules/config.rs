use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::info;

use crate::error::AppError;

/// Runtime settings for a sampling run. Every key is optional in the TOML
/// file; absent keys take the defaults below.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct HealthLogConfig {
    #[serde(default = "default_database_path")]
    pub database_path: String,

    #[serde(default = "default_probe_target")]
    pub probe_target: String,

    /// Name or path of the echo utility. Resolved through `PATH`.
    #[serde(default = "default_probe_binary")]
    pub probe_binary: String,

    #[serde(default = "default_cycles")]
    pub cycles: u32,

    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: u64,

    #[serde(default = "default_summary_limit")]
    pub summary_limit: u64,

    #[serde(default = "default_cpu_sample_millis")]
    pub cpu_sample_millis: u64,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,
}

fn default_database_path() -> String {
    "log.db".to_string()
}

fn default_probe_target() -> String {
    "8.8.8.8".to_string()
}

fn default_probe_binary() -> String {
    "ping".to_string()
}

fn default_cycles() -> u32 {
    5
}

fn default_interval_seconds() -> u64 {
    10
}

fn default_summary_limit() -> u64 {
    5
}

fn default_cpu_sample_millis() -> u64 {
    1000
}

fn default_log_dir() -> String {
    "logs".to_string()
}

impl Default for HealthLogConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            probe_target: default_probe_target(),
            probe_binary: default_probe_binary(),
            cycles: default_cycles(),
            interval_seconds: default_interval_seconds(),
            summary_limit: default_summary_limit(),
            cpu_sample_millis: default_cpu_sample_millis(),
            log_dir: default_log_dir(),
        }
    }
}

impl HealthLogConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }

    pub fn cpu_sample_window(&self) -> Duration {
        Duration::from_millis(self.cpu_sample_millis)
    }
}

/// Where a loaded config came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    /// No file existed at the given path.
    Defaults(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoadedConfig {
    pub config: HealthLogConfig,
    pub source: ConfigSource,
}

impl LoadedConfig {
    /// Reports how the config was obtained. Call after logging is installed.
    pub fn log_source(&self) {
        match &self.source {
            ConfigSource::File(path) => {
                info!(path = ?path, config = ?self.config, "Loaded config successfully.")
            }
            ConfigSource::Defaults(path) => {
                info!(path = ?path, config = ?self.config, "Config file not found, using defaults.")
            }
        }
    }
}

/// Loads the config file at `config_path_str`. A missing file is not an error:
/// the defaults are used instead. Nothing is logged here; see
/// [`LoadedConfig::log_source`].
pub fn load_config(config_path_str: &str) -> Result<LoadedConfig, AppError> {
    let config_path = Path::new(config_path_str);
    if !config_path.exists() {
        return Ok(LoadedConfig {
            config: HealthLogConfig::default(),
            source: ConfigSource::Defaults(config_path.to_path_buf()),
        });
    }

    let absolute_path = config_path
        .canonicalize()
        .unwrap_or_else(|_| config_path.to_path_buf());

    let config_str = fs::read_to_string(config_path).map_err(|e| {
        AppError::Config(format!("Failed to read config file at {config_path_str}: {e}"))
    })?;

    let config: HealthLogConfig = toml::from_str(&config_str).map_err(|e| {
        AppError::Config(format!("Failed to parse config file at {config_path_str}: {e}"))
    })?;

    Ok(LoadedConfig {
        config,
        source: ConfigSource::File(absolute_path),
    })
}
