//! The catalog: one connection plus the repositories over it.

use crate::actors::ActorRepository;
use crate::config::{CatalogConfig, config_error};
use crate::films::FilmRepository;
use crate::schema::FILMS;
use crate::users::UserRepository;
use filmotek_core::{Connection, Result};
use filmotek_query::OrderBy;
use filmotek_sqlite::SqliteConnection;

/// Owns a connection and hands out repositories borrowing it.
pub struct Catalog<C: Connection> {
    conn: C,
    default_film_sort: Vec<OrderBy>,
}

impl<C: Connection> Catalog<C> {
    /// Wrap `conn`; films list by rating, highest first.
    pub fn new(conn: C) -> Self {
        Self {
            conn,
            default_film_sort: Vec::new(),
        }
    }

    /// Wrap `conn`, taking the default film order from `config`.
    ///
    /// An unknown sort key in the configuration is a configuration error.
    pub fn with_config(conn: C, config: &CatalogConfig) -> Result<Self> {
        let sort = config.default_film_sort.trim();
        let default_film_sort = if sort.is_empty() {
            Vec::new()
        } else {
            OrderBy::parse_list(sort, &FILMS).map_err(|e| {
                config_error(
                    format!("invalid default film sort '{sort}'"),
                    Some(Box::new(e)),
                )
            })?
        };

        Ok(Self {
            conn,
            default_film_sort,
        })
    }

    pub fn connection(&self) -> &C {
        &self.conn
    }

    pub fn films(&self) -> FilmRepository<'_, C> {
        FilmRepository::new(&self.conn, &self.default_film_sort)
    }

    pub fn actors(&self) -> ActorRepository<'_, C> {
        ActorRepository::new(&self.conn)
    }

    pub fn users(&self) -> UserRepository<'_, C> {
        UserRepository::new(&self.conn)
    }
}

impl Catalog<SqliteConnection> {
    /// Open the SQLite database named by `config`.
    #[tracing::instrument(level = "info", skip(config), fields(path = %config.database_path))]
    pub fn open(config: &CatalogConfig) -> Result<Self> {
        let conn = SqliteConnection::open(&config.sqlite_config())?;
        tracing::info!("Catalog opened");
        Self::with_config(conn, config)
    }
}
