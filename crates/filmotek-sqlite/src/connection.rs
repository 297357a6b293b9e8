//! SQLite connection implementation.
//!
//! Safe wrappers around SQLite's C API implementing the `Connection` trait
//! from filmotek-core. Constraint failures are tagged with a SQLSTATE so the
//! layers above can tell a foreign-key violation from a unique violation.

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::borrow_as_ptr)]

use crate::types;
use asupersync::sync::{LockError, Mutex as AsyncMutex, MutexGuard as AsyncMutexGuard};
use filmotek_core::{
    Connection, Cx, Dialect, Error, Outcome, Row, SQLITE_UNICODE_LOWER, TransactionOps, Value,
    error::{
        ConnectionError, ConnectionErrorKind, QueryError, QueryErrorKind,
        SQLSTATE_FOREIGN_KEY_VIOLATION, SQLSTATE_UNIQUE_VIOLATION, TransactionError,
        TransactionErrorKind,
    },
    row::ColumnInfo,
};
use libsqlite3_sys as ffi;
use std::ffi::{CStr, CString, c_char, c_int};
use std::future::Future;
use std::ptr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

// The pre-generated bundled bindings of libsqlite3-sys omit
// `sqlite3_close_v2`, although the bundled library exports it.
unsafe extern "C" {
    fn sqlite3_close_v2(db: *mut ffi::sqlite3) -> c_int;
}

// Extended result codes for constraint failures.
const SQLITE_CONSTRAINT_FOREIGNKEY: c_int = 787;
const SQLITE_CONSTRAINT_PRIMARYKEY: c_int = 1555;
const SQLITE_CONSTRAINT_UNIQUE: c_int = 2067;

/// Configuration for opening SQLite connections.
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    /// Path to the database file, or ":memory:" for an in-memory database.
    pub path: String,
    /// Open flags (read-only, read-write, create)
    pub flags: OpenFlags,
    /// Busy timeout in milliseconds.
    pub busy_timeout_ms: u32,
    /// Enforce foreign keys (`PRAGMA foreign_keys`, set on open either way).
    pub foreign_keys: bool,
}

/// Flags controlling how the database is opened.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenFlags {
    /// Open for reading only.
    pub read_only: bool,
    /// Open for reading and writing.
    pub read_write: bool,
    /// Create the database if it doesn't exist.
    pub create: bool,
}

impl OpenFlags {
    /// Create flags for read-only access.
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Default::default()
        }
    }

    /// Create flags for read-write access (database must exist).
    pub fn read_write() -> Self {
        Self {
            read_write: true,
            ..Default::default()
        }
    }

    /// Create flags for read-write access with creation if needed.
    pub fn create_read_write() -> Self {
        Self {
            read_write: true,
            create: true,
            ..Default::default()
        }
    }

    fn to_sqlite_flags(self) -> c_int {
        let mut flags = 0;

        if self.read_only {
            flags |= ffi::SQLITE_OPEN_READONLY;
        }
        if self.read_write {
            flags |= ffi::SQLITE_OPEN_READWRITE;
        }
        if self.create {
            flags |= ffi::SQLITE_OPEN_CREATE;
        }

        // Default to read-write if no mode specified
        if flags & (ffi::SQLITE_OPEN_READONLY | ffi::SQLITE_OPEN_READWRITE) == 0 {
            flags |= ffi::SQLITE_OPEN_READWRITE | ffi::SQLITE_OPEN_CREATE;
        }

        flags | ffi::SQLITE_OPEN_FULLMUTEX
    }
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            path: ":memory:".to_string(),
            flags: OpenFlags::create_read_write(),
            busy_timeout_ms: 5000,
            foreign_keys: true,
        }
    }
}

impl SqliteConfig {
    /// Create a new config for a file-based database.
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Create a new config for an in-memory database.
    pub fn memory() -> Self {
        Self::default()
    }

    /// Set open flags.
    pub fn flags(mut self, flags: OpenFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Set busy timeout.
    pub fn busy_timeout(mut self, ms: u32) -> Self {
        self.busy_timeout_ms = ms;
        self
    }

    /// Turn foreign-key enforcement on or off.
    pub fn foreign_keys(mut self, enabled: bool) -> Self {
        self.foreign_keys = enabled;
        self
    }
}

struct SqliteInner {
    db: *mut ffi::sqlite3,
    in_transaction: bool,
}

// SAFETY: the handle is opened with SQLITE_OPEN_FULLMUTEX and every access
// goes through the Mutex in SqliteConnection.
unsafe impl Send for SqliteInner {}

impl SqliteInner {
    /// Execute SQL without binding (DDL, pragmas, scripts).
    fn exec(&self, sql: &str) -> Result<(), Error> {
        let c_sql = CString::new(sql).map_err(|_| null_byte_error(sql))?;

        let mut errmsg_ptr: *mut c_char = ptr::null_mut();

        // SAFETY: All pointers are valid
        let rc = unsafe {
            ffi::sqlite3_exec(
                self.db,
                c_sql.as_ptr(),
                None,
                ptr::null_mut(),
                &mut errmsg_ptr,
            )
        };

        if rc != ffi::SQLITE_OK {
            let message = if errmsg_ptr.is_null() {
                error_string(rc)
            } else {
                // SAFETY: errmsg_ptr was allocated by SQLite and is freed here
                unsafe {
                    let msg = CStr::from_ptr(errmsg_ptr).to_string_lossy().into_owned();
                    ffi::sqlite3_free(errmsg_ptr.cast());
                    msg
                }
            };
            // SAFETY: db is valid
            let code = unsafe { ffi::sqlite3_extended_errcode(self.db) };
            return Err(query_error(code, sql, message));
        }

        Ok(())
    }

    /// Prepare and execute a query, returning all rows.
    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, Error> {
        tracing::trace!(sql = %sql, params = params.len(), "Executing query");
        let stmt = Statement::prepare(self.db, sql)?;
        stmt.bind_all(params)?;

        // SAFETY: stmt is valid
        let col_count = unsafe { ffi::sqlite3_column_count(stmt.raw) };
        let col_names = (0..col_count)
            .map(|i| {
                // SAFETY: stmt is valid and i is in range
                unsafe { types::column_name(stmt.raw, i) }.unwrap_or_else(|| format!("col{}", i))
            })
            .collect();
        let columns = Arc::new(ColumnInfo::new(col_names));

        let mut rows = Vec::new();
        loop {
            // SAFETY: stmt is valid
            let rc = unsafe { ffi::sqlite3_step(stmt.raw) };
            match rc {
                ffi::SQLITE_ROW => {
                    let values = (0..col_count)
                        // SAFETY: stmt is valid, we just got SQLITE_ROW
                        .map(|i| unsafe { types::read_column(stmt.raw, i) })
                        .collect();
                    rows.push(Row::with_columns(Arc::clone(&columns), values));
                }
                ffi::SQLITE_DONE => break,
                _ => return Err(step_error(self.db, sql)),
            }
        }

        Ok(rows)
    }

    /// Prepare and execute a statement, returning rows affected.
    fn execute(&self, sql: &str, params: &[Value]) -> Result<u64, Error> {
        tracing::trace!(sql = %sql, params = params.len(), "Executing statement");
        let stmt = Statement::prepare(self.db, sql)?;
        stmt.bind_all(params)?;

        // SAFETY: stmt is valid
        let rc = unsafe { ffi::sqlite3_step(stmt.raw) };
        match rc {
            ffi::SQLITE_DONE | ffi::SQLITE_ROW => {
                // SAFETY: db is valid
                let changes = unsafe { ffi::sqlite3_changes(self.db) };
                Ok(u64::try_from(changes).unwrap_or(0))
            }
            _ => Err(step_error(self.db, sql)),
        }
    }

    /// Execute an INSERT and return its rowid. Both happen under the same
    /// lock, so another caller's insert cannot slip in between.
    fn insert(&self, sql: &str, params: &[Value]) -> Result<i64, Error> {
        self.execute(sql, params)?;
        // SAFETY: db is valid
        Ok(unsafe { ffi::sqlite3_last_insert_rowid(self.db) })
    }

    fn begin(&mut self) -> Result<(), Error> {
        if self.in_transaction {
            return Err(Error::Transaction(TransactionError {
                kind: TransactionErrorKind::AlreadyActive,
                message: "Already in a transaction".to_string(),
            }));
        }

        // IMMEDIATE takes the database write lock at BEGIN.
        self.exec("BEGIN IMMEDIATE")?;
        self.in_transaction = true;
        tracing::trace!("Transaction started");
        Ok(())
    }

    fn finish(&mut self, sql: &'static str) -> Result<(), Error> {
        if !self.in_transaction {
            return Err(Error::Transaction(TransactionError {
                kind: TransactionErrorKind::NotActive,
                message: "Not in a transaction".to_string(),
            }));
        }

        self.exec(sql)?;
        self.in_transaction = false;
        tracing::trace!(sql, "Transaction finished");
        Ok(())
    }
}

/// A connection to a SQLite database.
///
/// The connection can be shared between threads. Each statement runs under
/// an internal lock, and [`Connection::begin`] additionally takes the
/// connection's transaction gate: while a transaction is open, every other
/// caller waits for it to commit or roll back instead of seeing or joining
/// its uncommitted writes.
pub struct SqliteConnection {
    inner: Mutex<SqliteInner>,
    gate: AsyncMutex<()>,
    path: String,
}

impl SqliteConnection {
    /// Open a new SQLite connection with the given configuration.
    pub fn open(config: &SqliteConfig) -> Result<Self, Error> {
        let c_path = CString::new(config.path.as_str()).map_err(|_| {
            Error::Connection(ConnectionError {
                kind: ConnectionErrorKind::Connect,
                message: "Invalid path: contains null byte".to_string(),
                source: None,
            })
        })?;

        let mut db: *mut ffi::sqlite3 = ptr::null_mut();
        let flags = config.flags.to_sqlite_flags();

        // SAFETY: We pass valid pointers and check the return value
        let rc = unsafe { ffi::sqlite3_open_v2(c_path.as_ptr(), &mut db, flags, ptr::null()) };

        if rc != ffi::SQLITE_OK {
            let msg = if db.is_null() {
                error_string(rc)
            } else {
                // SAFETY: db is valid; it is closed after reading the message
                unsafe {
                    let msg = errmsg(db);
                    ffi::sqlite3_close(db);
                    msg
                }
            };

            return Err(Error::Connection(ConnectionError {
                kind: ConnectionErrorKind::Connect,
                message: format!("Failed to open database: {}", msg),
                source: None,
            }));
        }

        if config.busy_timeout_ms > 0 {
            let timeout = c_int::try_from(config.busy_timeout_ms).unwrap_or(c_int::MAX);
            // SAFETY: db is valid
            unsafe {
                ffi::sqlite3_busy_timeout(db, timeout);
            }
        }

        // From here on the handle is owned by `conn` and closed by its Drop.
        let conn = Self {
            inner: Mutex::new(SqliteInner {
                db,
                in_transaction: false,
            }),
            gate: AsyncMutex::new(()),
            path: config.path.clone(),
        };

        conn.register_unicode_lower()?;
        conn.execute_raw(if config.foreign_keys {
            "PRAGMA foreign_keys = ON"
        } else {
            "PRAGMA foreign_keys = OFF"
        })?;

        tracing::debug!(
            path = %conn.path,
            foreign_keys = config.foreign_keys,
            "Opened SQLite database"
        );

        Ok(conn)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, Error> {
        Self::open(&SqliteConfig::memory())
    }

    /// Open a file-based database.
    pub fn open_file(path: impl Into<String>) -> Result<Self, Error> {
        Self::open(&SqliteConfig::file(path))
    }

    /// Get the database path.
    pub fn path(&self) -> &str {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, SqliteInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Install `unicode_lower(text)`, a Unicode-aware replacement for the
    /// built-in `LOWER`, which only folds ASCII.
    fn register_unicode_lower(&self) -> Result<(), Error> {
        let name =
            CString::new(SQLITE_UNICODE_LOWER).map_err(|_| null_byte_error(SQLITE_UNICODE_LOWER))?;
        let inner = self.lock();
        // SAFETY: db is valid, name outlives the call and the callback
        // matches the scalar function signature
        let rc = unsafe {
            ffi::sqlite3_create_function_v2(
                inner.db,
                name.as_ptr(),
                1,
                ffi::SQLITE_UTF8 | ffi::SQLITE_DETERMINISTIC,
                ptr::null_mut(),
                Some(unicode_lower),
                None,
                None,
                None,
            )
        };

        if rc != ffi::SQLITE_OK {
            return Err(Error::Connection(ConnectionError {
                kind: ConnectionErrorKind::Connect,
                // SAFETY: db is valid
                message: format!("Failed to register {SQLITE_UNICODE_LOWER}: {}", unsafe {
                    errmsg(inner.db)
                }),
                source: None,
            }));
        }
        Ok(())
    }

    /// Execute SQL directly without binding (DDL, pragmas, scripts).
    ///
    /// Fails with [`ConnectionErrorKind::Unavailable`] while another caller
    /// holds a transaction on this connection.
    pub fn execute_raw(&self, sql: &str) -> Result<(), Error> {
        let Ok(_gate) = self.gate.try_lock() else {
            return Err(unavailable("A transaction is open on this connection"));
        };
        self.lock().exec(sql)
    }

    /// Is a transaction currently open on this connection?
    pub fn in_transaction(&self) -> bool {
        self.lock().in_transaction
    }

    fn query_sync(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, Error> {
        self.lock().query(sql, params)
    }

    fn execute_sync(&self, sql: &str, params: &[Value]) -> Result<u64, Error> {
        self.lock().execute(sql, params)
    }

    fn insert_sync(&self, sql: &str, params: &[Value]) -> Result<i64, Error> {
        self.lock().insert(sql, params)
    }

    fn begin_sync(&self) -> Result<(), Error> {
        self.lock().begin()
    }

    fn commit_sync(&self) -> Result<(), Error> {
        self.lock().finish("COMMIT")
    }

    fn rollback_sync(&self) -> Result<(), Error> {
        self.lock().finish("ROLLBACK")
    }

    /// Wait for the transaction gate.
    async fn acquire_gate(&self, cx: &Cx) -> Outcome<AsyncMutexGuard<'_, ()>, Error> {
        match self.gate.lock(cx).await {
            Ok(guard) => Outcome::Ok(guard),
            Err(LockError::Cancelled) => Outcome::Cancelled(cx.cancel_reason().unwrap_or_default()),
            Err(LockError::Poisoned) => {
                Outcome::Err(unavailable("Transaction gate poisoned by a panicked caller"))
            }
        }
    }

    /// Run a single statement outside any transaction, after waiting for
    /// an open one to finish.
    async fn exclusive<T>(
        &self,
        cx: &Cx,
        op: impl FnOnce(&SqliteInner) -> Result<T, Error>,
    ) -> Outcome<T, Error> {
        let _gate = match self.acquire_gate(cx).await {
            Outcome::Ok(guard) => guard,
            Outcome::Err(e) => return Outcome::Err(e),
            Outcome::Cancelled(reason) => return Outcome::Cancelled(reason),
            Outcome::Panicked(p) => return Outcome::Panicked(p),
        };
        run(cx, || op(&*self.lock()))
    }
}

impl Drop for SqliteConnection {
    fn drop(&mut self) {
        let inner = self.lock();
        if !inner.db.is_null() {
            // SAFETY: db is valid and not used after this point
            unsafe {
                sqlite3_close_v2(inner.db);
            }
        }
    }
}

/// Scalar `unicode_lower(text)`: full Unicode lowercasing; NULL stays NULL.
unsafe extern "C" fn unicode_lower(
    ctx: *mut ffi::sqlite3_context,
    argc: c_int,
    argv: *mut *mut ffi::sqlite3_value,
) {
    // SAFETY: SQLite passes `argc` valid values in `argv` for the duration
    // of the call, and `ctx` is the live function context.
    unsafe {
        if argc != 1 {
            ffi::sqlite3_result_null(ctx);
            return;
        }
        let value = *argv;
        if ffi::sqlite3_value_type(value) == ffi::SQLITE_NULL {
            ffi::sqlite3_result_null(ctx);
            return;
        }

        let text = ffi::sqlite3_value_text(value);
        let len = usize::try_from(ffi::sqlite3_value_bytes(value)).unwrap_or(0);
        let lowered = if text.is_null() {
            String::new()
        } else {
            String::from_utf8_lossy(std::slice::from_raw_parts(text, len)).to_lowercase()
        };

        let Ok(out_len) = c_int::try_from(lowered.len()) else {
            ffi::sqlite3_result_error_toobig(ctx);
            return;
        };
        ffi::sqlite3_result_text(
            ctx,
            lowered.as_ptr().cast::<c_char>(),
            out_len,
            ffi::SQLITE_TRANSIENT(),
        );
    }
}

/// A prepared statement, finalized on drop.
struct Statement {
    raw: *mut ffi::sqlite3_stmt,
    db: *mut ffi::sqlite3,
    sql: String,
}

impl Statement {
    fn prepare(db: *mut ffi::sqlite3, sql: &str) -> Result<Self, Error> {
        let c_sql = CString::new(sql).map_err(|_| null_byte_error(sql))?;
        let mut raw: *mut ffi::sqlite3_stmt = ptr::null_mut();

        // SAFETY: All pointers are valid
        let rc = unsafe {
            ffi::sqlite3_prepare_v2(
                db,
                c_sql.as_ptr(),
                c_sql.as_bytes().len() as c_int,
                &mut raw,
                ptr::null_mut(),
            )
        };

        if rc != ffi::SQLITE_OK {
            return Err(step_error(db, sql));
        }

        Ok(Self {
            raw,
            db,
            sql: sql.to_string(),
        })
    }

    fn bind_all(&self, params: &[Value]) -> Result<(), Error> {
        for (i, param) in params.iter().enumerate() {
            let index = c_int::try_from(i + 1).unwrap_or(c_int::MAX);
            // SAFETY: stmt is valid, index is 1-based
            let rc = unsafe { types::bind_value(self.raw, index, param) };
            if rc != ffi::SQLITE_OK {
                return Err(Error::Query(QueryError {
                    kind: QueryErrorKind::Database,
                    sql: Some(self.sql.clone()),
                    sqlstate: None,
                    // SAFETY: db is valid
                    message: format!("Failed to bind parameter {}: {}", i + 1, unsafe {
                        errmsg(self.db)
                    }),
                    source: None,
                }));
            }
        }
        Ok(())
    }
}

impl Drop for Statement {
    fn drop(&mut self) {
        // SAFETY: raw is valid (or null, which finalize accepts)
        unsafe {
            ffi::sqlite3_finalize(self.raw);
        }
    }
}

/// A SQLite transaction. Rolled back on drop unless committed.
///
/// Holds the connection's transaction gate until it is finished or dropped.
pub struct SqliteTransaction<'conn> {
    conn: &'conn SqliteConnection,
    finished: bool,
    // Released after `Drop::drop` has rolled back.
    _gate: AsyncMutexGuard<'conn, ()>,
}

impl<'conn> SqliteTransaction<'conn> {
    fn new(conn: &'conn SqliteConnection, gate: AsyncMutexGuard<'conn, ()>) -> Self {
        Self {
            conn,
            finished: false,
            _gate: gate,
        }
    }
}

impl std::fmt::Debug for SqliteTransaction<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteTransaction")
            .field("path", &self.conn.path)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

impl Drop for SqliteTransaction<'_> {
    fn drop(&mut self) {
        if !self.finished {
            if let Err(e) = self.conn.rollback_sync() {
                tracing::warn!(error = %e, "Rollback of dropped transaction failed");
            }
        }
    }
}

/// Run a synchronous operation unless the context has been cancelled.
fn run<T>(cx: &Cx, op: impl FnOnce() -> Result<T, Error>) -> Outcome<T, Error> {
    if let Some(reason) = cx.cancel_reason() {
        return Outcome::Cancelled(reason);
    }
    op().map_or_else(Outcome::Err, Outcome::Ok)
}

fn unavailable(message: &str) -> Error {
    Error::Connection(ConnectionError {
        kind: ConnectionErrorKind::Unavailable,
        message: message.to_string(),
        source: None,
    })
}

impl Connection for SqliteConnection {
    type Tx<'conn>
        = SqliteTransaction<'conn>
    where
        Self: 'conn;

    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    async fn query(&self, cx: &Cx, sql: &str, params: &[Value]) -> Outcome<Vec<Row>, Error> {
        self.exclusive(cx, |inner| inner.query(sql, params)).await
    }

    async fn query_one(
        &self,
        cx: &Cx,
        sql: &str,
        params: &[Value],
    ) -> Outcome<Option<Row>, Error> {
        self.exclusive(cx, |inner| {
            inner
                .query(sql, params)
                .map(|rows| rows.into_iter().next())
        })
        .await
    }

    async fn execute(&self, cx: &Cx, sql: &str, params: &[Value]) -> Outcome<u64, Error> {
        self.exclusive(cx, |inner| inner.execute(sql, params)).await
    }

    async fn insert(&self, cx: &Cx, sql: &str, params: &[Value]) -> Outcome<i64, Error> {
        self.exclusive(cx, |inner| inner.insert(sql, params)).await
    }

    async fn begin(&self, cx: &Cx) -> Outcome<Self::Tx<'_>, Error> {
        let gate = match self.acquire_gate(cx).await {
            Outcome::Ok(guard) => guard,
            Outcome::Err(e) => return Outcome::Err(e),
            Outcome::Cancelled(reason) => return Outcome::Cancelled(reason),
            Outcome::Panicked(p) => return Outcome::Panicked(p),
        };
        run(cx, || self.begin_sync()).map(|()| SqliteTransaction::new(self, gate))
    }
}

impl TransactionOps for SqliteTransaction<'_> {
    fn query(
        &self,
        cx: &Cx,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = Outcome<Vec<Row>, Error>> + Send {
        let outcome = run(cx, || self.conn.query_sync(sql, params));
        async move { outcome }
    }

    fn query_one(
        &self,
        cx: &Cx,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = Outcome<Option<Row>, Error>> + Send {
        let outcome = run(cx, || {
            self.conn
                .query_sync(sql, params)
                .map(|rows| rows.into_iter().next())
        });
        async move { outcome }
    }

    fn execute(
        &self,
        cx: &Cx,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = Outcome<u64, Error>> + Send {
        let outcome = run(cx, || self.conn.execute_sync(sql, params));
        async move { outcome }
    }

    fn insert(
        &self,
        cx: &Cx,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = Outcome<i64, Error>> + Send {
        let outcome = run(cx, || self.conn.insert_sync(sql, params));
        async move { outcome }
    }

    async fn commit(mut self, cx: &Cx) -> Outcome<(), Error> {
        // A cancelled commit leaves the transaction open; drop rolls it back.
        let outcome = run(cx, || self.conn.commit_sync());
        if matches!(outcome, Outcome::Ok(())) {
            self.finished = true;
        }
        outcome
    }

    async fn rollback(mut self, _cx: &Cx) -> Outcome<(), Error> {
        self.finished = true;
        self.conn
            .rollback_sync()
            .map_or_else(Outcome::Err, Outcome::Ok)
    }
}

// Helper functions

/// # Safety
/// `db` must be a valid connection handle.
unsafe fn errmsg(db: *mut ffi::sqlite3) -> String {
    // SAFETY: guaranteed by the caller; errmsg returns a valid C string
    unsafe {
        CStr::from_ptr(ffi::sqlite3_errmsg(db))
            .to_string_lossy()
            .into_owned()
    }
}

fn error_string(code: c_int) -> String {
    // SAFETY: errstr returns a static C string for any code
    unsafe {
        CStr::from_ptr(ffi::sqlite3_errstr(code))
            .to_string_lossy()
            .into_owned()
    }
}

fn null_byte_error(sql: &str) -> Error {
    Error::Query(QueryError {
        kind: QueryErrorKind::Syntax,
        sql: Some(sql.to_string()),
        sqlstate: None,
        message: "SQL contains null byte".to_string(),
        source: None,
    })
}

fn step_error(db: *mut ffi::sqlite3, sql: &str) -> Error {
    // SAFETY: db is valid
    let (code, message) = unsafe { (ffi::sqlite3_extended_errcode(db), errmsg(db)) };
    query_error(code, sql, message)
}

fn query_error(extended_code: c_int, sql: &str, message: String) -> Error {
    Error::Query(QueryError {
        kind: error_code_to_kind(extended_code),
        sql: Some(sql.to_string()),
        sqlstate: constraint_sqlstate(extended_code).map(str::to_string),
        message,
        source: None,
    })
}

fn constraint_sqlstate(extended_code: c_int) -> Option<&'static str> {
    match extended_code {
        SQLITE_CONSTRAINT_FOREIGNKEY => Some(SQLSTATE_FOREIGN_KEY_VIOLATION),
        SQLITE_CONSTRAINT_UNIQUE | SQLITE_CONSTRAINT_PRIMARYKEY => Some(SQLSTATE_UNIQUE_VIOLATION),
        _ => None,
    }
}

fn error_code_to_kind(extended_code: c_int) -> QueryErrorKind {
    match extended_code & 0xff {
        ffi::SQLITE_CONSTRAINT => QueryErrorKind::Constraint,
        ffi::SQLITE_BUSY | ffi::SQLITE_LOCKED => QueryErrorKind::Busy,
        ffi::SQLITE_PERM | ffi::SQLITE_AUTH | ffi::SQLITE_READONLY => QueryErrorKind::Permission,
        ffi::SQLITE_INTERRUPT => QueryErrorKind::Cancelled,
        ffi::SQLITE_ERROR => QueryErrorKind::Syntax,
        _ => QueryErrorKind::Database,
    }
}
