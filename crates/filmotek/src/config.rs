//! Catalog configuration.
//!
//! | Variable | Meaning | Default |
//! |----------|---------|---------|
//! | `FILMOTEK_DATABASE_PATH` | SQLite database file | `:memory:` |
//! | `FILMOTEK_BUSY_TIMEOUT_MS` | Busy timeout in milliseconds | `5000` |
//! | `FILMOTEK_FILM_SORT` | Film order when no `sortBy` is given | `-rating` |

use filmotek_core::Error;
use filmotek_core::error::ConfigError;
use filmotek_sqlite::SqliteConfig;
use std::env;

pub const ENV_DATABASE_PATH: &str = "FILMOTEK_DATABASE_PATH";
pub const ENV_BUSY_TIMEOUT_MS: &str = "FILMOTEK_BUSY_TIMEOUT_MS";
pub const ENV_FILM_SORT: &str = "FILMOTEK_FILM_SORT";

/// Default film order: rating, highest first.
pub const DEFAULT_FILM_SORT: &str = "-rating";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    pub database_path: String,
    pub busy_timeout_ms: u32,
    /// `sortBy` expression applied when a film listing names none
    pub default_film_sort: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            database_path: ":memory:".to_string(),
            busy_timeout_ms: 5000,
            default_film_sort: DEFAULT_FILM_SORT.to_string(),
        }
    }
}

impl CatalogConfig {
    pub fn new(database_path: impl Into<String>) -> Self {
        Self {
            database_path: database_path.into(),
            ..Self::default()
        }
    }

    pub fn busy_timeout(mut self, ms: u32) -> Self {
        self.busy_timeout_ms = ms;
        self
    }

    pub fn default_film_sort(mut self, sort: impl Into<String>) -> Self {
        self.default_film_sort = sort.into();
        self
    }

    /// Load from the process environment; unset variables keep defaults.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let mut config = Self::default();

        if let Some(path) = lookup(ENV_DATABASE_PATH) {
            if path.trim().is_empty() {
                return Err(config_error(format!("{ENV_DATABASE_PATH} is empty"), None));
            }
            config.database_path = path;
        }

        if let Some(raw) = lookup(ENV_BUSY_TIMEOUT_MS) {
            config.busy_timeout_ms = raw.trim().parse().map_err(|e| {
                config_error(
                    format!("{ENV_BUSY_TIMEOUT_MS} must be a non-negative integer, got '{raw}'"),
                    Some(Box::new(e)),
                )
            })?;
        }

        if let Some(sort) = lookup(ENV_FILM_SORT) {
            config.default_film_sort = sort;
        }

        tracing::debug!(
            database_path = %config.database_path,
            busy_timeout_ms = config.busy_timeout_ms,
            default_film_sort = %config.default_film_sort,
            "Loaded catalog configuration"
        );
        Ok(config)
    }

    pub fn sqlite_config(&self) -> SqliteConfig {
        SqliteConfig::file(self.database_path.clone()).busy_timeout(self.busy_timeout_ms)
    }
}

pub(crate) fn config_error(
    message: String,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
) -> Error {
    Error::Config(ConfigError { message, source })
}
