//! SQL expressions for WHERE and ORDER BY clauses.
//!
//! Every value that ends up in an expression is bound as a parameter; only
//! quoted identifiers are spliced into the statement text.

use filmotek_core::{Dialect, Value};

/// A SQL expression that can be used in WHERE and ORDER BY.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Column reference with optional table qualifier
    Column {
        /// Optional table name
        table: Option<String>,
        /// Column name
        name: String,
    },

    /// Literal value, always bound as a parameter
    Literal(Value),

    /// Binary operation (e.g., a = b, a AND b)
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },

    /// LIKE pattern match; `pattern` is bound as a parameter
    Like {
        expr: Box<Expr>,
        pattern: String,
        case_insensitive: bool,
        /// Escape character declared with `ESCAPE`
        escape: Option<char>,
    },

    /// Parenthesized expression
    Paren(Box<Expr>),
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Eq,
    And,
    Or,
}

impl BinaryOp {
    /// Get the SQL representation of this operator.
    pub const fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Eq => "=",
            BinaryOp::And => "AND",
            BinaryOp::Or => "OR",
        }
    }
}

/// Escape character used for substring patterns.
pub const LIKE_ESCAPE: char = '\\';

/// Escape LIKE wildcards so `term` only ever matches literally.
pub fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    for c in term.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            out.push(LIKE_ESCAPE);
        }
        out.push(c);
    }
    out
}

impl Expr {
    /// Create an unqualified column reference.
    pub fn col(name: impl Into<String>) -> Self {
        Expr::Column {
            table: None,
            name: name.into(),
        }
    }

    /// Create a table-qualified column reference.
    pub fn qualified(table: impl Into<String>, name: impl Into<String>) -> Self {
        Expr::Column {
            table: Some(table.into()),
            name: name.into(),
        }
    }

    /// Create a bound literal.
    pub fn value(value: impl Into<Value>) -> Self {
        Expr::Literal(value.into())
    }

    fn binary(self, op: BinaryOp, right: Expr) -> Self {
        Expr::Binary {
            left: Box::new(self),
            op,
            right: Box::new(right),
        }
    }

    /// Equal to (=)
    pub fn eq(self, other: impl Into<Expr>) -> Self {
        self.binary(BinaryOp::Eq, other.into())
    }

    /// Logical AND
    pub fn and(self, other: Expr) -> Self {
        self.binary(BinaryOp::And, other)
    }

    /// Logical OR
    pub fn or(self, other: Expr) -> Self {
        self.binary(BinaryOp::Or, other)
    }

    /// Wrap in parentheses.
    pub fn paren(self) -> Self {
        Expr::Paren(Box::new(self))
    }

    /// Case-insensitive substring match. Wildcards in `term` are escaped.
    pub fn contains_ci(self, term: &str) -> Self {
        Expr::Like {
            expr: Box::new(self),
            pattern: format!("%{}%", escape_like(term)),
            case_insensitive: true,
            escape: Some(LIKE_ESCAPE),
        }
    }

    /// OR together a list of expressions, parenthesized. `None` when empty.
    pub fn any(exprs: impl IntoIterator<Item = Expr>) -> Option<Self> {
        exprs
            .into_iter()
            .reduce(Expr::or)
            .map(Expr::paren)
    }

    /// Build SQL string with a specific dialect, appending bound values to `params`.
    ///
    /// `offset` is the number of parameters already bound before `params`.
    pub fn build_with_dialect(
        &self,
        dialect: Dialect,
        params: &mut Vec<Value>,
        offset: usize,
    ) -> String {
        match self {
            Expr::Column { table, name } => {
                if let Some(t) = table {
                    format!(
                        "{}.{}",
                        dialect.quote_identifier(t),
                        dialect.quote_identifier(name)
                    )
                } else {
                    dialect.quote_identifier(name)
                }
            }

            Expr::Literal(value) => {
                params.push(value.clone());
                dialect.placeholder(offset + params.len())
            }

            Expr::Binary { left, op, right } => {
                let left_sql = left.build_with_dialect(dialect, params, offset);
                let right_sql = right.build_with_dialect(dialect, params, offset);
                format!("{left_sql} {} {right_sql}", op.as_str())
            }

            Expr::Like {
                expr,
                pattern,
                case_insensitive,
                escape,
            } => {
                let expr_sql = expr.build_with_dialect(dialect, params, offset);
                params.push(Value::Text(pattern.clone()));
                let param = dialect.placeholder(offset + params.len());
                let escape_sql = escape.map_or_else(String::new, |c| format!(" ESCAPE '{c}'"));
                if *case_insensitive {
                    let lower = dialect.lower_function();
                    format!("{lower}({expr_sql}) LIKE {lower}({param}){escape_sql}")
                } else {
                    format!("{expr_sql} LIKE {param}{escape_sql}")
                }
            }

            Expr::Paren(expr) => {
                let expr_sql = expr.build_with_dialect(dialect, params, offset);
                format!("({expr_sql})")
            }
        }
    }
}

impl From<Value> for Expr {
    fn from(value: Value) -> Self {
        Expr::Literal(value)
    }
}

impl From<i64> for Expr {
    fn from(v: i64) -> Self {
        Expr::Literal(Value::BigInt(v))
    }
}

impl From<&str> for Expr {
    fn from(v: &str) -> Self {
        Expr::Literal(Value::Text(v.to_string()))
    }
}
