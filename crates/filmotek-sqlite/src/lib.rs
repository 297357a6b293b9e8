//! SQLite storage connection for the Filmotek catalog store.
//!
// FFI bindings require unsafe code
#![allow(unsafe_code)]
//!
//! Implements the `Connection` trait from filmotek-core over `libsqlite3-sys`
//! (bundled SQLite).
//!
//! - Foreign keys are enforced by default; `PRAGMA foreign_keys` is set on
//!   open to whatever the config asks for
//! - `unicode_lower(text)` is registered on every connection for
//!   case-insensitive matching beyond ASCII
//! - Foreign-key failures carry SQLSTATE `23503`, unique failures `23505`
//! - Each statement checks the caller's `Cx` for cancellation first
//! - A transaction dropped without commit is rolled back
//!
//! # Example
//!
//! ```rust,ignore
//! use filmotek_sqlite::SqliteConnection;
//! use filmotek_core::{Connection, Cx, Outcome, Value};
//!
//! let conn = SqliteConnection::open_memory().unwrap();
//! conn.execute_raw("CREATE TABLE actors (id INTEGER PRIMARY KEY, first_name TEXT)").unwrap();
//!
//! let cx = Cx::for_testing();
//! match conn.insert(&cx, "INSERT INTO actors (first_name) VALUES (?1)", &[Value::from("Al")]).await {
//!     Outcome::Ok(id) => println!("inserted actor {id}"),
//!     Outcome::Err(e) => eprintln!("error: {e}"),
//!     _ => {}
//! }
//! ```
//!
//! # Thread Safety
//!
//! `SqliteConnection` is `Send` and `Sync`; the raw handle sits behind a
//! mutex and is opened in SQLite's serialized threading mode. An open
//! transaction holds the connection exclusively: other callers wait until it
//! commits or rolls back.

pub mod connection;
pub mod types;

pub use connection::{OpenFlags, SqliteConfig, SqliteConnection, SqliteTransaction};

use std::ffi::CStr;

/// Version string of the linked SQLite library.
pub fn sqlite_version() -> &'static str {
    // SAFETY: sqlite3_libversion returns a pointer to a static C string
    unsafe { CStr::from_ptr(libsqlite3_sys::sqlite3_libversion()) }
        .to_str()
        .unwrap_or("unknown")
}
