//! Runtime configuration.
//!
//! Read from the process environment, after loading an optional `.env` file.
//!
//! | Variable | Default |
//! |---|---|
//! | `PATIENT_REGISTRY_DB` | `patients.db` |
//! | `PATIENT_REGISTRY_LOG_LEVEL` | `debug` (debug builds) / `info` (release) |
//! | `PATIENT_REGISTRY_LOG_DIR` | unset: file logging disabled |

use std::path::PathBuf;

use thiserror::Error;

use crate::db::{Database, DbResult};
use crate::logging::{default_log_level, init_logging, normalize_level, LoggingError};

pub const DB_PATH_VAR: &str = "PATIENT_REGISTRY_DB";
pub const LOG_LEVEL_VAR: &str = "PATIENT_REGISTRY_LOG_LEVEL";
pub const LOG_DIR_VAR: &str = "PATIENT_REGISTRY_LOG_DIR";

const DEFAULT_DB_PATH: &str = "patients.db";

/// Configuration errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is set but empty")]
    EmptyValue(&'static str),

    #[error("Invalid {var}: {source}")]
    InvalidLogLevel {
        var: &'static str,
        source: LoggingError,
    },
}

/// Where the registry stores data and how it logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    pub database_path: PathBuf,
    pub log_level: &'static str,
    pub log_dir: Option<PathBuf>,
}

impl RegistryConfig {
    /// Load from `.env` (if present) and the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_path = match lookup(DB_PATH_VAR) {
            Some(value) => PathBuf::from(non_empty(DB_PATH_VAR, value)?),
            None => PathBuf::from(DEFAULT_DB_PATH),
        };

        let log_level = match lookup(LOG_LEVEL_VAR) {
            Some(value) => normalize_level(&value).map_err(|source| {
                ConfigError::InvalidLogLevel {
                    var: LOG_LEVEL_VAR,
                    source,
                }
            })?,
            None => default_log_level(),
        };

        let log_dir = lookup(LOG_DIR_VAR)
            .map(|value| non_empty(LOG_DIR_VAR, value).map(PathBuf::from))
            .transpose()?;

        Ok(Self {
            database_path,
            log_level,
            log_dir,
        })
    }

    /// Open (and bootstrap) the configured database.
    pub fn open_database(&self) -> DbResult<Database> {
        Database::open(&self.database_path)
    }

    /// Start file logging if a log directory is configured.
    pub fn init_logging(&self) -> Result<(), LoggingError> {
        match &self.log_dir {
            Some(dir) => init_logging(self.log_level, dir),
            None => Ok(()),
        }
    }
}

fn non_empty(var: &'static str, value: String) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::EmptyValue(var));
    }
    Ok(trimmed.to_string())
}
