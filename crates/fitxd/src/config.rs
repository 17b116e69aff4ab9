//! Process configuration.
//!
//! Every setting comes from an environment variable and can be overridden by
//! the matching command-line flag. A `.env` file is loaded by the binary
//! before parsing, so the same variables can live there.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::filter::LevelFilter;

use crate::sensors::SensorMap;
use crate::utilization::DEFAULT_FITX_URL;

pub const DEFAULT_INTERVAL_SECS: u64 = 3600;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Top-level configuration
#[derive(Debug, Clone, Parser)]
#[command(name = "fitxd", version)]
#[command(about = "Publishes FitX studio utilization as Home Assistant sensors")]
pub struct Config {
    /// Base URL of the Home Assistant instance
    #[arg(long, env = "HA_URL")]
    pub ha_url: String,

    /// Long-lived access token for Home Assistant
    #[arg(long, env = "HA_TOKEN", hide_env_values = true)]
    pub ha_token: String,

    /// Log level: trace, debug, info, warn, error
    #[arg(long, env = "LOG_LEVEL", default_value = "INFO")]
    pub log_level: String,

    /// Seconds to sleep between polling cycles
    #[arg(long, env = "INTERVAL", default_value_t = DEFAULT_INTERVAL_SECS)]
    pub interval: u64,

    /// Base URL of the utilization API
    #[arg(long, env = "FITX_URL", default_value = DEFAULT_FITX_URL)]
    pub fitx_url: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "REQUEST_TIMEOUT", default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub request_timeout: u64,

    /// TOML file listing the sensors to publish (replaces the built-in list)
    #[arg(long, env = "SENSORS_FILE")]
    pub sensors_file: Option<PathBuf>,

    /// Run a single polling cycle and exit
    #[arg(long, env = "ONCE")]
    pub once: bool,
}

impl Config {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Load the sensor mapping from `sensors_file`, or the built-in one
    pub fn sensors(&self) -> Result<SensorMap, ConfigError> {
        match &self.sensors_file {
            Some(path) => SensorMap::from_file(path),
            None => Ok(SensorMap::default()),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" | "critical" | "fatal" => Ok(LogLevel::Error),
            _ => Err(ConfigError::InvalidLogLevel(s.to_string())),
        }
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid log level '{0}'")]
    InvalidLogLevel(String),

    #[error("Failed to read sensor file {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse sensor file {0}: {1}")]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("No sensors configured")]
    NoSensors,

    #[error("Sensor '{0}' is configured more than once")]
    DuplicateSensor(String),
}
