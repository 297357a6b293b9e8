//! Statement builders for INSERT, UPDATE, DELETE and keyed SELECT.
//!
//! Column names passed to these builders are quoted, never validated: callers
//! only hand in names from their own fixed vocabulary.

use crate::clause::{OrderBy, Where};
use crate::expr::Expr;
use crate::table::TableInfo;
use filmotek_core::{Dialect, Value};

fn push_filter(where_clause: Option<Where>, expr: Expr) -> Option<Where> {
    Some(match where_clause {
        Some(existing) => existing.and(expr),
        None => Where::new(expr),
    })
}

/// INSERT statement builder.
#[derive(Debug, Clone)]
pub struct InsertBuilder {
    table: String,
    values: Vec<(String, Value)>,
}

impl InsertBuilder {
    /// Create a new INSERT builder for the given table.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            values: Vec::new(),
        }
    }

    /// Add one column value.
    pub fn value(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.push((column.into(), value.into()));
        self
    }

    /// Add several column values in order.
    pub fn values<K: Into<String>>(
        mut self,
        values: impl IntoIterator<Item = (K, Value)>,
    ) -> Self {
        self.values
            .extend(values.into_iter().map(|(k, v)| (k.into(), v)));
        self
    }

    /// Build the INSERT SQL and parameters.
    pub fn build_with_dialect(&self, dialect: Dialect) -> (String, Vec<Value>) {
        let columns: Vec<_> = self
            .values
            .iter()
            .map(|(name, _)| dialect.quote_identifier(name))
            .collect();
        let placeholders: Vec<_> = (1..=self.values.len())
            .map(|i| dialect.placeholder(i))
            .collect();
        let params = self.values.iter().map(|(_, v)| v.clone()).collect();

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            dialect.quote_identifier(&self.table),
            columns.join(", "),
            placeholders.join(", ")
        );

        (sql, params)
    }
}

/// UPDATE statement builder.
#[derive(Debug, Clone)]
pub struct UpdateBuilder {
    table: String,
    set: Vec<(String, Value)>,
    where_clause: Option<Where>,
}

impl UpdateBuilder {
    /// Create a new UPDATE builder for the given table.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            set: Vec::new(),
            where_clause: None,
        }
    }

    /// Assign one column.
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set.push((column.into(), value.into()));
        self
    }

    /// Assign several columns in order.
    pub fn set_all<K: Into<String>>(
        mut self,
        values: impl IntoIterator<Item = (K, Value)>,
    ) -> Self {
        self.set.extend(values.into_iter().map(|(k, v)| (k.into(), v)));
        self
    }

    /// Add a WHERE condition.
    pub fn filter(mut self, expr: Expr) -> Self {
        self.where_clause = push_filter(self.where_clause, expr);
        self
    }

    /// True when no column is assigned; such a builder must not be executed.
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Build the UPDATE SQL and parameters.
    pub fn build_with_dialect(&self, dialect: Dialect) -> (String, Vec<Value>) {
        let mut params = Vec::with_capacity(self.set.len() + 1);
        let mut set_clauses = Vec::with_capacity(self.set.len());

        for (name, value) in &self.set {
            params.push(value.clone());
            set_clauses.push(format!(
                "{} = {}",
                dialect.quote_identifier(name),
                dialect.placeholder(params.len())
            ));
        }

        let mut sql = format!(
            "UPDATE {} SET {}",
            dialect.quote_identifier(&self.table),
            set_clauses.join(", ")
        );

        if let Some(where_clause) = &self.where_clause {
            let (where_sql, where_params) = where_clause.build_with_dialect(dialect, params.len());
            sql.push_str(" WHERE ");
            sql.push_str(&where_sql);
            params.extend(where_params);
        }

        (sql, params)
    }
}

/// DELETE statement builder.
#[derive(Debug, Clone)]
pub struct DeleteBuilder {
    table: String,
    where_clause: Option<Where>,
}

impl DeleteBuilder {
    /// Create a new DELETE builder for the given table.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            where_clause: None,
        }
    }

    /// Add a WHERE condition.
    pub fn filter(mut self, expr: Expr) -> Self {
        self.where_clause = push_filter(self.where_clause, expr);
        self
    }

    /// Build the DELETE SQL and parameters.
    pub fn build_with_dialect(&self, dialect: Dialect) -> (String, Vec<Value>) {
        let mut sql = format!("DELETE FROM {}", dialect.quote_identifier(&self.table));
        let mut params = Vec::new();

        if let Some(where_clause) = &self.where_clause {
            let (where_sql, where_params) = where_clause.build_with_dialect(dialect, 0);
            sql.push_str(" WHERE ");
            sql.push_str(&where_sql);
            params = where_params;
        }

        (sql, params)
    }
}

/// SELECT over a single table's columns.
#[derive(Debug, Clone)]
pub struct Select {
    table: &'static TableInfo,
    where_clause: Option<Where>,
    order_by: Vec<OrderBy>,
}

impl Select {
    /// Select every column of `table`.
    pub fn from(table: &'static TableInfo) -> Self {
        Self {
            table,
            where_clause: None,
            order_by: Vec::new(),
        }
    }

    /// Shorthand for a lookup by primary key.
    pub fn by_key(table: &'static TableInfo, key: impl Into<Value>) -> Self {
        let key = Expr::Literal(key.into());
        Self::from(table).filter(Expr::qualified(table.name, table.primary_key).eq(key))
    }

    /// Add a WHERE condition.
    pub fn filter(mut self, expr: Expr) -> Self {
        self.where_clause = push_filter(self.where_clause, expr);
        self
    }

    /// Add an ORDER BY key.
    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order_by.push(order);
        self
    }

    /// Build the SELECT SQL and parameters.
    pub fn build_with_dialect(&self, dialect: Dialect) -> (String, Vec<Value>) {
        let mut sql = format!(
            "SELECT {} FROM {}",
            column_list(self.table, dialect),
            dialect.quote_identifier(self.table.name)
        );
        let mut params = Vec::new();

        if let Some(where_clause) = &self.where_clause {
            let (where_sql, where_params) = where_clause.build_with_dialect(dialect, 0);
            sql.push_str(" WHERE ");
            sql.push_str(&where_sql);
            params = where_params;
        }

        if !self.order_by.is_empty() {
            let keys: Vec<_> = self.order_by.iter().map(|o| o.to_sql(dialect)).collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&keys.join(", "));
        }

        (sql, params)
    }
}

/// Comma-separated, table-qualified list of every column of `table`.
pub(crate) fn column_list(table: &TableInfo, dialect: Dialect) -> String {
    let quoted_table = dialect.quote_identifier(table.name);
    table
        .columns
        .iter()
        .map(|c| format!("{quoted_table}.{}", dialect.quote_identifier(c)))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    static ACTORS: TableInfo = TableInfo {
        name: "actors",
        primary_key: "id",
        columns: &["id", "first_name", "last_name"],
    };

    #[test]
    fn test_insert() {
        let (sql, params) = InsertBuilder::new("actors_and_films")
            .value("film_id", 3_i64)
            .value("actor_id", 8_i64)
            .build_with_dialect(Dialect::Sqlite);
        assert_eq!(
            sql,
            "INSERT INTO \"actors_and_films\" (\"film_id\", \"actor_id\") VALUES (?1, ?2)"
        );
        assert_eq!(params, vec![Value::BigInt(3), Value::BigInt(8)]);
    }

    #[test]
    fn test_update_by_identity() {
        let builder = UpdateBuilder::new("films")
            .set("title", "Heat")
            .set("description", Value::Null)
            .filter(Expr::col("id").eq(12_i64));
        assert!(!builder.is_empty());
        let (sql, params) = builder.build_with_dialect(Dialect::Sqlite);
        assert_eq!(
            sql,
            "UPDATE \"films\" SET \"title\" = ?1, \"description\" = ?2 WHERE \"id\" = ?3"
        );
        assert_eq!(
            params,
            vec![Value::Text("Heat".into()), Value::Null, Value::BigInt(12)]
        );
    }

    #[test]
    fn test_update_empty() {
        assert!(UpdateBuilder::new("films").is_empty());
    }

    #[test]
    fn test_delete_with_two_conditions() {
        let (sql, params) = DeleteBuilder::new("actors_and_films")
            .filter(Expr::col("film_id").eq(1_i64))
            .filter(Expr::col("actor_id").eq(2_i64))
            .build_with_dialect(Dialect::Sqlite);
        assert_eq!(
            sql,
            "DELETE FROM \"actors_and_films\" WHERE \"film_id\" = ?1 AND \"actor_id\" = ?2"
        );
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_select_by_key() {
        let (sql, params) = Select::by_key(&ACTORS, 5_i64).build_with_dialect(Dialect::Sqlite);
        assert_eq!(
            sql,
            "SELECT \"actors\".\"id\", \"actors\".\"first_name\", \"actors\".\"last_name\" \
             FROM \"actors\" WHERE \"actors\".\"id\" = ?1"
        );
        assert_eq!(params, vec![Value::BigInt(5)]);
    }
}
