//! Error types for catalog storage operations.
//!
//! The taxonomy mirrors what callers at the HTTP boundary need to tell apart:
//!
//! - [`Error::NotFound`] - the targeted row, or a referenced row, does not exist
//! - [`Error::Invariant`] - an identity-scoped statement touched more than one row
//! - everything else - ordinary storage, decoding or configuration failures

use std::fmt;

/// The primary error type for all catalog operations.
#[derive(Debug)]
pub enum Error {
    /// Connection-related errors (open, acquire)
    Connection(ConnectionError),
    /// Statement execution errors reported by the store
    Query(QueryError),
    /// Row decoding errors
    Type(TypeError),
    /// Transaction state errors
    Transaction(TransactionError),
    /// Configuration errors
    Config(ConfigError),
    /// Request validation errors
    Validation(ValidationError),
    /// A targeted or referenced record does not exist
    NotFound(NotFoundError),
    /// An identity-scoped mutation affected more than one row
    Invariant(InvariantError),
    /// Custom error with message
    Custom(String),
}

#[derive(Debug)]
pub struct ConnectionError {
    pub kind: ConnectionErrorKind,
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionErrorKind {
    /// Failed to open the database
    Connect,
    /// The connection could not be acquired for this operation
    Unavailable,
}

#[derive(Debug)]
pub struct QueryError {
    pub kind: QueryErrorKind,
    pub sql: Option<String>,
    pub sqlstate: Option<String>,
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryErrorKind {
    /// Syntax error in SQL
    Syntax,
    /// Constraint violation (unique, foreign key, check)
    Constraint,
    /// Permission denied
    Permission,
    /// Store busy or locked by another writer
    Busy,
    /// Interrupted
    Cancelled,
    /// Other database error
    Database,
}

#[derive(Debug)]
pub struct TypeError {
    pub expected: &'static str,
    pub actual: String,
    pub column: Option<String>,
}

#[derive(Debug)]
pub struct TransactionError {
    pub kind: TransactionErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionErrorKind {
    /// BEGIN issued while a transaction is already open
    AlreadyActive,
    /// COMMIT/ROLLBACK issued without an open transaction
    NotActive,
}

#[derive(Debug)]
pub struct ConfigError {
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

/// The kind of catalog record an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    User,
    Actor,
    Film,
}

impl EntityKind {
    /// Storage table backing this kind of record.
    pub const fn table(self) -> &'static str {
        match self {
            EntityKind::User => "users",
            EntityKind::Actor => "actors",
            EntityKind::Film => "films",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

/// A targeted or referenced record does not exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotFoundError {
    /// Which kind of record was looked for
    pub entity: EntityKind,
    /// The identity (or unique value) that was not found
    pub identity: String,
}

impl NotFoundError {
    pub fn new(entity: EntityKind, identity: impl fmt::Display) -> Self {
        Self {
            entity,
            identity: identity.to_string(),
        }
    }
}

/// More than one row matched a statement restricted to a single identity.
///
/// With a unique primary key this cannot happen; observing it means the
/// stored model is corrupt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError {
    pub table: &'static str,
    pub identity: String,
    pub rows_affected: u64,
}

/// Validation error for request fields.
#[derive(Debug, Clone, Default)]
pub struct ValidationError {
    pub errors: Vec<FieldValidationError>,
}

/// A single validation error for a field.
#[derive(Debug, Clone)]
pub struct FieldValidationError {
    /// The attribute name, in its external form
    pub field: String,
    pub kind: ValidationErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Value is below minimum
    Min,
    /// Value is above maximum
    Max,
    /// String is shorter than minimum length
    MinLength,
    /// String is longer than maximum length
    MaxLength,
    /// Required field is missing or empty
    Required,
    /// Value is not one of the accepted choices
    Choice,
}

impl ValidationError {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add(
        &mut self,
        field: impl Into<String>,
        kind: ValidationErrorKind,
        message: impl Into<String>,
    ) {
        self.errors.push(FieldValidationError {
            field: field.into(),
            kind,
            message: message.into(),
        });
    }

    pub fn add_max(&mut self, field: impl Into<String>, max: impl fmt::Display, actual: impl fmt::Display) {
        self.add(
            field,
            ValidationErrorKind::Max,
            format!("must be at most {max}, got {actual}"),
        );
    }

    pub fn add_min_length(&mut self, field: impl Into<String>, min: usize, actual: usize) {
        self.add(
            field,
            ValidationErrorKind::MinLength,
            format!("must be at least {min} characters, got {actual}"),
        );
    }

    pub fn add_max_length(&mut self, field: impl Into<String>, max: usize, actual: usize) {
        self.add(
            field,
            ValidationErrorKind::MaxLength,
            format!("must be at most {max} characters, got {actual}"),
        );
    }

    pub fn add_required(&mut self, field: impl Into<String>) {
        self.add(field, ValidationErrorKind::Required, "is required");
    }

    pub fn add_choice(&mut self, field: impl Into<String>, value: &str) {
        self.add(
            field,
            ValidationErrorKind::Choice,
            format!("unknown value '{value}'"),
        );
    }

    /// Convert to Result, returning Ok(()) if no errors, Err(self) otherwise.
    pub fn into_result(self) -> std::result::Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl Error {
    /// Shorthand for a [`NotFoundError`].
    pub fn not_found(entity: EntityKind, identity: impl fmt::Display) -> Self {
        Error::NotFound(NotFoundError::new(entity, identity))
    }

    /// Does this error map to a "not found" response?
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// Does this error indicate model corruption rather than a runtime failure?
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Invariant(_))
    }

    /// Is this a foreign-key violation reported by the store?
    pub fn is_foreign_key_violation(&self) -> bool {
        match self {
            Error::Query(q) => q.is_foreign_key_violation(),
            _ => false,
        }
    }

    /// Is this a unique-constraint violation reported by the store?
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Error::Query(q) => q.is_unique_violation(),
            _ => false,
        }
    }

    /// Get SQLSTATE if available (e.g., "23505" for unique violation)
    pub fn sqlstate(&self) -> Option<&str> {
        match self {
            Error::Query(q) => q.sqlstate.as_deref(),
            _ => None,
        }
    }

    /// Get the SQL that caused this error, if available
    pub fn sql(&self) -> Option<&str> {
        match self {
            Error::Query(q) => q.sql.as_deref(),
            _ => None,
        }
    }
}

impl QueryError {
    /// Is this a unique constraint violation?
    pub fn is_unique_violation(&self) -> bool {
        self.sqlstate.as_deref() == Some(SQLSTATE_UNIQUE_VIOLATION)
    }

    /// Is this a foreign key violation?
    pub fn is_foreign_key_violation(&self) -> bool {
        self.sqlstate.as_deref() == Some(SQLSTATE_FOREIGN_KEY_VIOLATION)
    }
}

/// SQLSTATE reported for unique constraint violations.
pub const SQLSTATE_UNIQUE_VIOLATION: &str = "23505";
/// SQLSTATE reported for foreign key violations.
pub const SQLSTATE_FOREIGN_KEY_VIOLATION: &str = "23503";

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Connection(e) => write!(f, "Connection error: {}", e.message),
            Error::Query(e) => {
                if let Some(sqlstate) = &e.sqlstate {
                    write!(f, "Query error (SQLSTATE {}): {}", sqlstate, e.message)
                } else {
                    write!(f, "Query error: {}", e.message)
                }
            }
            Error::Type(e) => write!(f, "Type error: {}", e),
            Error::Transaction(e) => write!(f, "Transaction error: {}", e.message),
            Error::Config(e) => write!(f, "Configuration error: {}", e.message),
            Error::Validation(e) => write!(f, "Validation error: {}", e),
            Error::NotFound(e) => write!(f, "{}", e),
            Error::Invariant(e) => write!(f, "Invariant violation: {}", e),
            Error::Custom(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Connection(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            Error::Query(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            Error::Config(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            Error::Validation(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(sqlstate) = &self.sqlstate {
            write!(f, "{} (SQLSTATE {})", self.message, sqlstate)
        } else {
            write!(f, "{}", self.message)
        }
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(col) = &self.column {
            write!(
                f,
                "expected {} for column '{}', found {}",
                self.expected, col, self.actual
            )
        } else {
            write!(f, "expected {}, found {}", self.expected, self.actual)
        }
    }
}

impl fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "record not found in {} with {}",
            self.entity.table(),
            self.identity
        )
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rows affected in {} for identity {}",
            self.rows_affected, self.table, self.identity
        )
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            write!(f, "validation passed")
        } else if self.errors.len() == 1 {
            let err = &self.errors[0];
            write!(f, "validation error on '{}': {}", err.field, err.message)
        } else {
            writeln!(f, "validation errors:")?;
            for err in &self.errors {
                writeln!(f, "  - {}: {}", err.field, err.message)?;
            }
            Ok(())
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ConnectionError> for Error {
    fn from(err: ConnectionError) -> Self {
        Error::Connection(err)
    }
}

impl From<QueryError> for Error {
    fn from(err: QueryError) -> Self {
        Error::Query(err)
    }
}

impl From<TypeError> for Error {
    fn from(err: TypeError) -> Self {
        Error::Type(err)
    }
}

impl From<TransactionError> for Error {
    fn from(err: TransactionError) -> Self {
        Error::Transaction(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err)
    }
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Self {
        Error::Validation(err)
    }
}

impl From<NotFoundError> for Error {
    fn from(err: NotFoundError) -> Self {
        Error::NotFound(err)
    }
}

/// Result type alias for catalog operations.
pub type Result<T> = std::result::Result<T, Error>;
