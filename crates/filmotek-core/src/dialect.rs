//! SQL dialect differences that statement builders need to know about.

/// Name of the Unicode-aware lowercasing scalar function a SQLite connection
/// registers. SQLite's built-in `LOWER` and `LIKE` only fold ASCII.
pub const SQLITE_UNICODE_LOWER: &str = "unicode_lower";

/// SQL dialect for generating dialect-specific SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// SQLite dialect (uses ?1, ?2 placeholders)
    Sqlite,
}

impl Dialect {
    /// Generate a placeholder for the given parameter index (1-based).
    pub fn placeholder(self, index: usize) -> String {
        match self {
            Dialect::Sqlite => format!("?{index}"),
        }
    }

    /// Function that lowercases text for case-insensitive matching.
    pub const fn lower_function(self) -> &'static str {
        match self {
            Dialect::Sqlite => SQLITE_UNICODE_LOWER,
        }
    }

    /// Quote an identifier for this dialect.
    ///
    /// Embedded quote characters are doubled, so any input is safe to splice.
    pub fn quote_identifier(self, name: &str) -> String {
        match self {
            Dialect::Sqlite => format!("\"{}\"", name.replace('"', "\"\"")),
        }
    }
}
