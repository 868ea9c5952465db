//! System configuration: square-off timing and trade ledger location.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Wall-clock format of `sq_off_timing`.
pub const SQ_OFF_TIME_FORMAT: &str = "%H:%M";

/// System configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Local time of the daily auto square-off, `HH:MM`.
    #[serde(default = "default_sq_off_timing")]
    pub sq_off_timing: String,
    /// Path of the JSON-lines trade ledger.
    #[serde(default = "default_trades_record_file")]
    pub trades_record_file: String,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            sq_off_timing: default_sq_off_timing(),
            trades_record_file: default_trades_record_file(),
        }
    }
}

impl SystemConfig {
    /// Parsed square-off time.
    pub fn sq_off_time(&self) -> Result<NaiveTime, ConfigError> {
        NaiveTime::parse_from_str(self.sq_off_timing.trim(), SQ_OFF_TIME_FORMAT).map_err(|e| {
            ConfigError::ValidationError(format!(
                "system.sq_off_timing '{}' is not HH:MM: {e}",
                self.sq_off_timing
            ))
        })
    }
}

fn default_sq_off_timing() -> String {
    "15:15".to_string()
}

fn default_trades_record_file() -> String {
    "logs/trades.jsonl".to_string()
}
