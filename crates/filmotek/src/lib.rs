//! Filmotek - a films and actors catalog store.
//!
//! The interesting part is how mutations reach storage:
//!
//! - Requests come in two shapes. Full requests write every attribute;
//!   partial requests use [`Patch`] to tell "not sent" from "cleared".
//! - [`IntoChangeSet`] reduces a request to ordered column writes.
//! - [`MutationExecutor`] applies a change-set as one UPDATE keyed by identity
//!   and insists on exactly one affected row.
//! - [`RelationReconciler`] diffs a film's stored actor set against the
//!   desired one and writes only the difference.
//! - Repositories run the scalar write and the relation diff in one
//!   transaction: both persist or neither does.
//!
//! # Example
//!
//! ```rust,ignore
//! use filmotek::{Catalog, CatalogConfig, Cx, PartialUpdateFilm, Patch};
//!
//! let catalog = Catalog::open(&CatalogConfig::from_env()?)?;
//! let cx = Cx::for_testing();
//!
//! let request = PartialUpdateFilm {
//!     rating: Patch::Value(9),
//!     actors_ids: Patch::Value(vec![2, 3, 4]),
//!     ..Default::default()
//! };
//! catalog.films().partial_update(&cx, 1, &request).await;
//! ```

/// Unwrap `Outcome::Ok`, returning any other outcome from the enclosing function.
macro_rules! try_outcome {
    ($expr:expr) => {
        match $expr {
            ::filmotek_core::Outcome::Ok(value) => value,
            ::filmotek_core::Outcome::Err(e) => return ::filmotek_core::Outcome::Err(e),
            ::filmotek_core::Outcome::Cancelled(r) => return ::filmotek_core::Outcome::Cancelled(r),
            ::filmotek_core::Outcome::Panicked(p) => return ::filmotek_core::Outcome::Panicked(p),
        }
    };
}

/// Unwrap `Ok`, returning `Outcome::Err` from the enclosing function.
macro_rules! try_result {
    ($expr:expr) => {
        match $expr {
            Ok(value) => value,
            Err(e) => return ::filmotek_core::Outcome::Err(e.into()),
        }
    };
}

pub mod actors;
pub mod catalog;
pub mod changeset;
pub mod config;
pub mod executor;
pub mod films;
pub mod model;
pub mod reconcile;
pub mod request;
pub mod schema;
pub mod users;
pub mod validate;

#[cfg(test)]
mod testing;

pub use actors::ActorRepository;
pub use catalog::Catalog;
pub use changeset::{ChangeSet, IntoChangeSet};
pub use config::CatalogConfig;
pub use executor::MutationExecutor;
pub use films::FilmRepository;
pub use model::{Actor, ActorWithFilms, Date, Film, FilmWithActors, Sex, User};
pub use reconcile::{RelationDiff, RelationReconciler};
pub use request::{
    AddActor, AddFilm, CreateUser, ListQuery, PartialUpdateActor, PartialUpdateFilm, Patch,
    UpdateActor, UpdateFilm,
};
pub use users::UserRepository;
pub use validate::Validate;

pub use filmotek_core::{
    Connection, Cx, EntityKind, Error, NotFoundError, Outcome, Result, TransactionOps,
    ValidationError, Value,
};
pub use filmotek_sqlite::{SqliteConfig, SqliteConnection};
