//! Configuration module for the TeZ engine.
//!
//! Loads the YAML configuration, interpolates environment variables and
//! validates the instrument table against the trading settings.
//!
//! # Usage
//!
//! ```rust,ignore
//! use tez_engine::config::{config_path, load_config};
//!
//! // Load from TEZ_CONFIG or config.yaml
//! let config = load_config(Some(&config_path()))?;
//!
//! println!("square-off at {}", config.system.sq_off_timing);
//! ```

mod observability;
mod paper;
mod system;
mod trading;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use observability::{LoggingConfig, ObservabilityConfig};
pub use paper::PaperConfig;
pub use system::{SQ_OFF_TIME_FORMAT, SystemConfig};
pub use trading::TradingConfig;

use crate::domain::instrument::{InstrumentInfo, InstrumentResolver};

/// Environment variable overriding the config path.
pub const CONFIG_PATH_ENV: &str = "TEZ_CONFIG";

/// Default config path.
pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// System settings.
    #[serde(default)]
    pub system: SystemConfig,
    /// Trading settings.
    #[serde(default)]
    pub trading: TradingConfig,
    /// Instrument table, keyed by a free-form id.
    #[serde(default)]
    pub instruments: BTreeMap<String, InstrumentInfo>,
    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
    /// Paper session parameters.
    #[serde(default)]
    pub paper: PaperConfig,
}

impl Config {
    /// Resolver over the configured instruments.
    #[must_use]
    pub fn resolver(&self) -> InstrumentResolver {
        InstrumentResolver::new(self.instruments.clone())
    }
}

// ============================================
// Configuration Loading
// ============================================

/// Config path from `TEZ_CONFIG`, or `config.yaml`.
#[must_use]
pub fn config_path() -> String {
    std::env::var(CONFIG_PATH_ENV)
        .ok()
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
}

/// Load configuration from a YAML file with environment variable interpolation.
///
/// # Arguments
///
/// * `path` - Optional path to the config file. Defaults to "config.yaml".
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or(DEFAULT_CONFIG_PATH);

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string (useful for testing).
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: Config = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax.
#[allow(clippy::expect_used)] // Regex is compile-time constant; expect() is safe here
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |cap: &regex::Captures<'_>| {
        let default_value = cap.get(2).map(|m| m.as_str());
        match std::env::var(&cap[1]) {
            Ok(v) if !v.is_empty() => v,
            _ => default_value.map_or_else(String::new, str::to_string),
        }
    })
    .into_owned()
}

/// Validate configuration values.
fn validate_config(config: &Config) -> Result<(), ConfigError> {
    config.system.sq_off_time()?;

    if config.system.trades_record_file.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "system.trades_record_file must not be empty".to_string(),
        ));
    }

    if config.trading.quantity == 0 {
        return Err(ConfigError::ValidationError(
            "trading.quantity must be at least one lot".to_string(),
        ));
    }

    for (id, info) in &config.instruments {
        info.validate()
            .map_err(|e| ConfigError::ValidationError(format!("instruments.{id}: {e}")))?;
    }

    let exchange = config.trading.exchange;
    let resolver = config.resolver();
    if resolver.underlyings(exchange).is_empty() {
        return Err(ConfigError::ValidationError(format!(
            "no instruments configured for exchange {exchange}"
        )));
    }
    resolver
        .resolve(exchange, &config.trading.default_underlying)
        .map_err(|e| ConfigError::ValidationError(format!("trading.default_underlying: {e}")))?;

    Ok(())
}
