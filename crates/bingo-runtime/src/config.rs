//! Runtime configuration read from the environment.

use std::str::FromStr;

use crate::error::AppError;

/// Default SQLite database, created on first use.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://bingo.db?mode=rwc";

/// Which `SessionRepository` backend to run with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    /// Process-local map; sessions vanish on exit.
    #[default]
    Memory,
    /// Durable local SQLite file.
    Sqlite,
}

impl FromStr for StoreBackend {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(AppError::Config(format!(
                "BINGO_STORE must be `memory` or `sqlite`, got `{other}`"
            ))),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Multi-line human-readable output.
    Pretty,
}

impl FromStr for LogFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            other => Err(AppError::Config(format!(
                "BINGO_LOG_FORMAT must be `json` or `pretty`, got `{other}`"
            ))),
        }
    }
}

/// Settings for one runtime instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Repository backend (`BINGO_STORE`).
    pub store: StoreBackend,
    /// SQLite URL (`DATABASE_URL`), used by the sqlite backend.
    pub database_url: String,
    /// Log format (`BINGO_LOG_FORMAT`).
    pub log_format: LogFormat,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            store: StoreBackend::default(),
            database_url: DEFAULT_DATABASE_URL.to_owned(),
            log_format: LogFormat::default(),
        }
    }
}

impl RuntimeConfig {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable holds an unknown value.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name
    /// to its value. Unset variables fall back to the defaults.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if a variable holds an unknown value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let store = lookup("BINGO_STORE")
            .map(|v| v.parse::<StoreBackend>())
            .transpose()?
            .unwrap_or(defaults.store);
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.database_url);
        let log_format = lookup("BINGO_LOG_FORMAT")
            .map(|v| v.parse::<LogFormat>())
            .transpose()?
            .unwrap_or(defaults.log_format);

        Ok(Self {
            store,
            database_url,
            log_format,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = RuntimeConfig::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config, RuntimeConfig::default());
        assert_eq!(config.store, StoreBackend::Memory);
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_reads_all_variables() {
        let config = RuntimeConfig::from_lookup(lookup(&[
            ("BINGO_STORE", "SQLite"),
            ("DATABASE_URL", "sqlite://other.db"),
            ("BINGO_LOG_FORMAT", "pretty"),
        ]))
        .unwrap();

        assert_eq!(config.store, StoreBackend::Sqlite);
        assert_eq!(config.database_url, "sqlite://other.db");
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_unknown_store_is_config_error() {
        let result = RuntimeConfig::from_lookup(lookup(&[("BINGO_STORE", "postgres")]));

        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_unknown_log_format_is_config_error() {
        let result = RuntimeConfig::from_lookup(lookup(&[("BINGO_LOG_FORMAT", "xml")]));

        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
