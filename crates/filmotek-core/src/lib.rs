//! Core types and traits for the Filmotek catalog store.
//!
//! - `Value` and `Row` for parameter binding and result decoding
//! - `Error` taxonomy shared by every layer (not-found, invariant, storage)
//! - `Connection` / `TransactionOps` traits implemented by storage drivers
//! - `Dialect` and the attribute-to-column naming rule
//! - `Outcome` and `Cx` re-exported from asupersync for cancel-correct operations

pub use asupersync::{Cx, Outcome};

pub mod connection;
pub mod dialect;
pub mod error;
pub mod naming;
pub mod row;
pub mod value;

pub use connection::{Connection, TransactionOps};
pub use dialect::{Dialect, SQLITE_UNICODE_LOWER};
pub use error::{
    EntityKind, Error, FieldValidationError, InvariantError, NotFoundError, Result,
    ValidationError, ValidationErrorKind,
};
pub use naming::to_column_name;
pub use row::{FromValue, Row};
pub use value::Value;
