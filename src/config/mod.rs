//! Configuration
//!
//! A JSON file; every field is optional:
//!
//! ```json
//! {
//!   "time_zone": "+08:00",
//!   "default_terms_size": 100,
//!   "log_level": "info"
//! }
//! ```
//!
//! The file is validated once at load time. A config that loads is always
//! usable.

use std::fs;
use std::path::Path;

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::observability::Severity;
use crate::translator::{TranslatorOptions, DEFAULT_TIME_ZONE};

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

impl ConfigError {
    pub fn code(&self) -> &'static str {
        "AGG_CONFIG_INVALID"
    }

    fn invalid(reason: impl Into<String>) -> Self {
        ConfigError::Invalid(reason.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Offset applied to date histograms (optional, default "+08:00")
    #[serde(default = "default_time_zone")]
    pub time_zone: String,

    /// `size` for terms levels without a LIMIT (optional, backend default when unset)
    #[serde(default)]
    pub default_terms_size: Option<u64>,

    /// Minimum log severity (optional, default "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_time_zone() -> String {
    DEFAULT_TIME_ZONE.to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            time_zone: default_time_zone(),
            default_terms_size: None,
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        parse_offset(&self.time_zone).ok_or_else(|| {
            ConfigError::invalid(format!(
                "time_zone must be a +HH:MM offset, got '{}'",
                self.time_zone
            ))
        })?;

        if self.default_terms_size == Some(0) {
            return Err(ConfigError::invalid("default_terms_size must be > 0"));
        }

        if Severity::parse(&self.log_level).is_none() {
            return Err(ConfigError::invalid(format!(
                "log_level must be one of trace, info, warn, error, fatal, got '{}'",
                self.log_level
            )));
        }

        Ok(())
    }

    pub fn translator_options(&self) -> TranslatorOptions {
        TranslatorOptions {
            time_zone: self.time_zone.clone(),
            default_terms_size: self.default_terms_size,
        }
    }

    /// Falls back to INFO; a validated config always parses
    pub fn min_severity(&self) -> Severity {
        Severity::parse(&self.log_level).unwrap_or(Severity::Info)
    }
}

/// `±HH:MM` to a fixed offset
fn parse_offset(value: &str) -> Option<FixedOffset> {
    let (sign, rest) = match value.as_bytes().first()? {
        b'+' => (1, &value[1..]),
        b'-' => (-1, &value[1..]),
        _ => return None,
    };
    let (hours, minutes) = rest.split_once(':')?;
    if hours.len() != 2 || minutes.len() != 2 {
        return None;
    }
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if minutes >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
