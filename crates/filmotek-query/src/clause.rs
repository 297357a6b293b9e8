//! SQL clause types (WHERE, ORDER BY).

use crate::expr::Expr;
use crate::table::TableInfo;
use filmotek_core::{Dialect, ValidationError, Value, to_column_name};

/// WHERE clause.
#[derive(Debug, Clone)]
pub struct Where {
    expr: Expr,
}

impl Where {
    /// Create a new WHERE clause with the given expression.
    pub fn new(expr: Expr) -> Self {
        Self { expr }
    }

    /// Add an AND condition.
    pub fn and(self, expr: Expr) -> Self {
        Self {
            expr: self.expr.and(expr),
        }
    }

    /// Build the WHERE clause with a parameter offset.
    pub fn build_with_dialect(&self, dialect: Dialect, offset: usize) -> (String, Vec<Value>) {
        let mut params = Vec::new();
        let sql = self.expr.build_with_dialect(dialect, &mut params, offset);
        (sql, params)
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

/// ORDER BY clause over one column.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    column: Expr,
    direction: OrderDirection,
}

/// Prefix marking a descending key in a `sortBy` list.
pub const DESCENDING_MARKER: char = '-';

impl OrderBy {
    /// Create an ascending order by clause.
    pub fn asc(column: Expr) -> Self {
        Self {
            column,
            direction: OrderDirection::Asc,
        }
    }

    /// Create a descending order by clause.
    pub fn desc(column: Expr) -> Self {
        Self {
            column,
            direction: OrderDirection::Desc,
        }
    }

    pub fn column(&self) -> &Expr {
        &self.column
    }

    pub fn direction(&self) -> OrderDirection {
        self.direction
    }

    /// Generate SQL for this ORDER BY clause.
    pub fn to_sql(&self, dialect: Dialect) -> String {
        let mut params = Vec::new();
        let mut sql = self.column.build_with_dialect(dialect, &mut params, 0);
        sql.push_str(match self.direction {
            OrderDirection::Asc => " ASC",
            OrderDirection::Desc => " DESC",
        });
        sql
    }

    /// Parse a comma-separated `sortBy` list against a table's columns.
    ///
    /// Each key is an attribute name (`releaseDate`), optionally prefixed with
    /// [`DESCENDING_MARKER`]. Keys are normalized to column names and must name
    /// a column of `table`; unknown keys are rejected so that nothing from the
    /// request reaches the statement text. Empty segments are ignored.
    ///
    /// ```
    /// use filmotek_query::{OrderBy, OrderDirection, TableInfo};
    ///
    /// static FILMS: TableInfo = TableInfo {
    ///     name: "films",
    ///     primary_key: "id",
    ///     columns: &["id", "title", "rating"],
    /// };
    ///
    /// let order = OrderBy::parse_list("title,-rating", &FILMS).unwrap();
    /// assert_eq!(order.len(), 2);
    /// assert_eq!(order[1].direction(), OrderDirection::Desc);
    /// ```
    pub fn parse_list(input: &str, table: &TableInfo) -> Result<Vec<OrderBy>, ValidationError> {
        let mut orders = Vec::new();
        let mut errors = ValidationError::new();

        for key in input.split(',').map(str::trim).filter(|k| !k.is_empty()) {
            let (name, descending) = match key.strip_prefix(DESCENDING_MARKER) {
                Some(rest) => (rest.trim(), true),
                None => (key, false),
            };

            let column = to_column_name(name);
            let Some(known) = table.columns.iter().find(|c| **c == column) else {
                errors.add_choice("sortBy", key);
                continue;
            };

            let expr = Expr::qualified(table.name, *known);
            orders.push(if descending {
                OrderBy::desc(expr)
            } else {
                OrderBy::asc(expr)
            });
        }

        errors.into_result().map(|()| orders)
    }
}
