//! Application configuration
//!
//! Built-in defaults, overlaid by an optional TOML file and then by
//! `KMHCAL23__SECTION__KEY` environment variables.

use config::{Config, ConfigError, Environment, File};
use data_validator::{FormLimits, DEFAULT_LOWER_BOUND, DEFAULT_UPPER_BOUND};
use report::DEFAULT_CHART_SIZE;
use serde::{Deserialize, Serialize};
use tracing::Level;

use crate::error::LoggingError;

/// Config file read when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "kmhcal23.toml";
/// Env var naming an alternative config file
pub const CONFIG_PATH_ENV: &str = "KMHCAL23_CONFIG";
const ENV_PREFIX: &str = "KMHCAL23";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model artifact (.onnx or .json)
    pub path: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: "MLP.onnx".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Image width (px)
    pub width: u32,
    /// Image height (px)
    pub height: u32,
    /// Initial text of the lower bound input
    pub default_lower_bound: String,
    /// Initial text of the upper bound input
    pub default_upper_bound: String,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_CHART_SIZE.0,
            height: DEFAULT_CHART_SIZE.1,
            default_lower_bound: DEFAULT_LOWER_BOUND.to_string(),
            default_upper_bound: DEFAULT_UPPER_BOUND.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Max level: trace, debug, info, warn, error
    pub level: String,
    /// Emit JSON lines instead of text
    pub json: bool,
}

impl LoggingConfig {
    /// Parsed `level`
    pub fn max_level(&self) -> Result<Level, LoggingError> {
        self.level
            .parse()
            .map_err(|_| LoggingError::InvalidLevel(self.level.clone()))
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub chart: ChartConfig,
    pub logging: LoggingConfig,
    pub limits: FormLimits,
}

impl AppConfig {
    /// Load configuration. `path` wins over `KMHCAL23_CONFIG`, which wins
    /// over `kmhcal23.toml`; a missing file is not an error.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let path = path
            .map(str::to_string)
            .or_else(|| std::env::var(CONFIG_PATH_ENV).ok())
            .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());

        Config::builder()
            .add_source(Config::try_from(&AppConfig::default())?)
            .add_source(File::with_name(&path).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
