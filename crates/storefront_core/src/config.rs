//! Storefront runtime configuration.
//!
//! # Responsibility
//! - Describe where the database and logs live and report thresholds.
//! - Load settings from a TOML file; every key is optional.
//!
//! # Invariants
//! - `low_stock_threshold >= 0`.
//! - `log_level` is validated by `init_logging`, not here.

use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const DEFAULT_DATABASE_PATH: &str = "storefront.sqlite3";
const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 5;
const DEFAULT_REPORT_LIMIT: u32 = 10;

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
    NegativeThreshold(i64),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
            Self::NegativeThreshold(value) => {
                write!(f, "low_stock_threshold must be >= 0, got {value}")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::NegativeThreshold(_) => None,
        }
    }
}

/// Settings shared by the CLI and embedding applications.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// SQLite database file.
    pub database_path: PathBuf,
    /// `trace|debug|info|warn|error`; defaults to the build-mode level.
    pub log_level: String,
    /// Absolute directory for rolling log files; file logging is off when unset.
    pub log_dir: Option<PathBuf>,
    /// Stock level at or below which products are reported as low.
    pub low_stock_threshold: i64,
    /// Default row limit for ranking reports.
    pub report_limit: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            log_level: crate::logging::default_log_level().to_string(),
            log_dir: None,
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            report_limit: DEFAULT_REPORT_LIMIT,
        }
    }
}

impl StoreConfig {
    /// Reads and validates a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.low_stock_threshold < 0 {
            return Err(ConfigError::NegativeThreshold(self.low_stock_threshold));
        }
        Ok(())
    }
}
