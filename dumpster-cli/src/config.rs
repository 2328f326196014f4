//! TOML configuration for the `dumpster` binary.
//!
//! Every section and key is optional:
//!
//! ```toml
//! [database]
//! backend = "sqlite"
//! connection_string = "dumpster.db"
//!
//! [route]
//! start_time = "08:00"
//!
//! [pricing]
//! price_sheet = "prices.csv"
//!
//! [logging]
//! level = "info"
//! file = "dumpster.log"
//! ```

use std::path::{Path, PathBuf};

use chrono::NaiveTime;
use dumpster_core::db::DbConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_DATABASE: &str = "dumpster.db";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid route start time '{0}', expected HH:MM")]
    InvalidStartTime(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DbConfig,
    pub route: RouteConfig,
    pub pricing: PricingConfig,
    pub logging: LoggingConfig,
}

/// A `dumpster.db` SQLite file and an 8 AM route start.
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DbConfig {
                backend: "sqlite".to_string(),
                connection_string: DEFAULT_DATABASE.to_string(),
            },
            route: RouteConfig::default(),
            pricing: PricingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteConfig {
    /// Departure time of the first leg, `HH:MM`.
    pub start_time: String,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            start_time: "08:00".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// CSV price sheet used instead of the stored table.
    pub price_sheet: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Bare level or full `EnvFilter` directive.
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl AppConfig {
    /// Reads `path`, or returns the defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn route_start_time(&self) -> Result<NaiveTime, ConfigError> {
        parse_start_time(&self.route.start_time)
    }
}

/// Parses `HH:MM` (24-hour) or `H:MM AM/PM`.
pub fn parse_start_time(value: &str) -> Result<NaiveTime, ConfigError> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%I:%M %p"))
        .map_err(|_| ConfigError::InvalidStartTime(value.to_string()))
}
