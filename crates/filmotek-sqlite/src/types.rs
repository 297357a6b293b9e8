//! Type encoding and decoding between `Value` and SQLite storage classes.
//!
//! | Value | SQLite |
//! |-------|--------|
//! | `Bool` | INTEGER (0/1) |
//! | `Int`, `BigInt` | INTEGER |
//! | `Double` | REAL |
//! | `Text` | TEXT |
//! | `Bytes` | BLOB |
//! | `Date` | TEXT (`YYYY-MM-DD`) |

use filmotek_core::Value;
use libsqlite3_sys as ffi;
use std::ffi::{CStr, c_int};

/// Bind a Value to a prepared statement parameter.
///
/// # Safety
/// - `stmt` must be a valid, non-null prepared statement handle
/// - `index` must be a valid 1-based parameter index
pub unsafe fn bind_value(stmt: *mut ffi::sqlite3_stmt, index: c_int, value: &Value) -> c_int {
    // SAFETY: the caller guarantees `stmt` and `index`; text and blob
    // buffers are copied by SQLite (SQLITE_TRANSIENT) before returning.
    unsafe {
        match value {
            Value::Null => ffi::sqlite3_bind_null(stmt, index),

            Value::Bool(b) => ffi::sqlite3_bind_int(stmt, index, c_int::from(*b)),

            Value::Int(v) => ffi::sqlite3_bind_int(stmt, index, *v),

            Value::BigInt(v) => ffi::sqlite3_bind_int64(stmt, index, *v),

            Value::Double(v) => ffi::sqlite3_bind_double(stmt, index, *v),

            Value::Text(s) => bind_text(stmt, index, s),

            Value::Bytes(b) => ffi::sqlite3_bind_blob(
                stmt,
                index,
                b.as_ptr().cast(),
                b.len() as c_int,
                ffi::SQLITE_TRANSIENT(),
            ),

            Value::Date(days) => match Value::date_to_iso(*days) {
                Some(date) => bind_text(stmt, index, &date),
                None => ffi::SQLITE_RANGE,
            },
        }
    }
}

unsafe fn bind_text(stmt: *mut ffi::sqlite3_stmt, index: c_int, s: &str) -> c_int {
    let bytes = s.as_bytes();
    // SAFETY: the buffer is valid for the duration of the call and copied.
    unsafe {
        ffi::sqlite3_bind_text(
            stmt,
            index,
            bytes.as_ptr().cast(),
            bytes.len() as c_int,
            ffi::SQLITE_TRANSIENT(),
        )
    }
}

/// Read a column value from a result row.
///
/// Integers that fit in 32 bits come back as `Value::Int`.
///
/// # Safety
/// - `stmt` must be a valid prepared statement that has just returned SQLITE_ROW
/// - `index` must be a valid 0-based column index
pub unsafe fn read_column(stmt: *mut ffi::sqlite3_stmt, index: c_int) -> Value {
    // SAFETY: guaranteed by the caller; pointers returned by SQLite stay
    // valid until the next step/finalize and are copied out immediately.
    unsafe {
        match ffi::sqlite3_column_type(stmt, index) {
            ffi::SQLITE_NULL => Value::Null,

            ffi::SQLITE_INTEGER => {
                let v = ffi::sqlite3_column_int64(stmt, index);
                i32::try_from(v).map_or(Value::BigInt(v), Value::Int)
            }

            ffi::SQLITE_FLOAT => Value::Double(ffi::sqlite3_column_double(stmt, index)),

            ffi::SQLITE_TEXT => {
                let ptr = ffi::sqlite3_column_text(stmt, index);
                let len = ffi::sqlite3_column_bytes(stmt, index);
                if ptr.is_null() {
                    Value::Null
                } else {
                    let slice = std::slice::from_raw_parts(ptr.cast::<u8>(), len as usize);
                    Value::Text(String::from_utf8_lossy(slice).into_owned())
                }
            }

            ffi::SQLITE_BLOB => {
                let ptr = ffi::sqlite3_column_blob(stmt, index);
                let len = ffi::sqlite3_column_bytes(stmt, index);
                if ptr.is_null() || len == 0 {
                    Value::Bytes(Vec::new())
                } else {
                    let slice = std::slice::from_raw_parts(ptr.cast::<u8>(), len as usize);
                    Value::Bytes(slice.to_vec())
                }
            }

            _ => Value::Null,
        }
    }
}

/// Get the column name from a result.
///
/// # Safety
/// - `stmt` must be a valid prepared statement
/// - `index` must be a valid 0-based column index
pub unsafe fn column_name(stmt: *mut ffi::sqlite3_stmt, index: c_int) -> Option<String> {
    // SAFETY: guaranteed by the caller.
    unsafe {
        let ptr = ffi::sqlite3_column_name(stmt, index);
        if ptr.is_null() {
            None
        } else {
            CStr::from_ptr(ptr).to_str().ok().map(String::from)
        }
    }
}
