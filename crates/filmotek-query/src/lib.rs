//! Statement construction for the Filmotek catalog store.
//!
//! - **Expression DSL**: `Expr` builds WHERE clauses with every value bound
//!   as a parameter.
//! - **Statement builders**: INSERT, UPDATE and DELETE keyed by identity, and
//!   keyed SELECT.
//! - **Listing composer**: primary rows joined through a link table, with
//!   free-text search, multi-key sort and a per-row association fetch.
//!
//! The resulting statements execute through the `Connection` trait from
//! `filmotek-core`.

pub mod builder;
pub mod clause;
pub mod expr;
pub mod select;
pub mod table;

pub use builder::{DeleteBuilder, InsertBuilder, Select, UpdateBuilder};
pub use clause::{DESCENDING_MARKER, OrderBy, OrderDirection, Where};
pub use expr::{BinaryOp, Expr, escape_like};
pub use select::{Listing, linked_keys_query};
pub use table::{LinkTableInfo, TableInfo};
