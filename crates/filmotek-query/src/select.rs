//! Listing queries over a table joined through a many-to-many link.
//!
//! A listing is composed in two steps:
//!
//! 1. [`Listing::build_with_dialect`] selects the primary rows, joined to the
//!    associated table so a search term can match either side, grouped by the
//!    primary key so each primary row appears once.
//! 2. [`Listing::association_query`] fetches the associated rows for one
//!    primary key; callers run it once per primary row.
//!
//! The two steps are separate statements, so a concurrent writer may change
//! an association between them.

use crate::builder::column_list;
use crate::clause::OrderBy;
use crate::expr::Expr;
use crate::table::{LinkTableInfo, TableInfo};
use filmotek_core::{Dialect, Value};

/// Composer for a listing of `primary` rows with their linked rows.
#[derive(Debug, Clone)]
pub struct Listing {
    primary: &'static TableInfo,
    link: &'static LinkTableInfo,
    search_columns: Vec<Expr>,
    search: Option<String>,
    order_by: Vec<OrderBy>,
    default_order: Vec<OrderBy>,
}

impl Listing {
    /// Start a listing of `primary` rows linked through `link`.
    pub fn new(primary: &'static TableInfo, link: &'static LinkTableInfo) -> Self {
        Self {
            primary,
            link,
            search_columns: Vec::new(),
            search: None,
            order_by: Vec::new(),
            default_order: Vec::new(),
        }
    }

    /// Columns of `table` (either side of the join) a search term is matched against.
    pub fn search_in(mut self, table: &'static TableInfo, columns: &[&'static str]) -> Self {
        self.search_columns
            .extend(columns.iter().map(|c| Expr::qualified(table.name, *c)));
        self
    }

    /// Restrict to rows where any search column contains `term`, ignoring case.
    ///
    /// `None` or a blank term disables the restriction.
    pub fn search(mut self, term: Option<&str>) -> Self {
        self.search = term
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        self
    }

    /// Order used when no explicit order is given.
    pub fn default_order(mut self, order: OrderBy) -> Self {
        self.default_order = vec![order];
        self
    }

    /// Explicit order, in precedence order. Empty falls back to the default.
    pub fn order_by(mut self, orders: Vec<OrderBy>) -> Self {
        self.order_by = orders;
        self
    }

    fn primary_key(&self) -> Expr {
        Expr::qualified(self.primary.name, self.primary.primary_key)
    }

    fn effective_order(&self) -> Vec<OrderBy> {
        let mut orders = if self.order_by.is_empty() {
            self.default_order.clone()
        } else {
            self.order_by.clone()
        };
        // Ties fall back to the primary key so pages are stable.
        let pk = self.primary_key();
        if !orders.iter().any(|o| *o.column() == pk) {
            orders.push(OrderBy::asc(pk));
        }
        orders
    }

    /// Build the primary listing statement and its parameters.
    pub fn build_with_dialect(&self, dialect: Dialect) -> (String, Vec<Value>) {
        let link_table = dialect.quote_identifier(self.link.table);
        let remote = self.link.remote;
        let remote_table = dialect.quote_identifier(remote.name);
        let primary_table = dialect.quote_identifier(self.primary.name);
        let mut params = Vec::new();

        let mut sql = format!(
            "SELECT {} FROM {primary_table} \
             LEFT JOIN {link_table} ON {link_table}.{} = {primary_table}.{} \
             LEFT JOIN {remote_table} ON {remote_table}.{} = {link_table}.{}",
            column_list(self.primary, dialect),
            dialect.quote_identifier(self.link.local_column),
            dialect.quote_identifier(self.primary.primary_key),
            dialect.quote_identifier(remote.primary_key),
            dialect.quote_identifier(self.link.remote_column),
        );

        if let Some(term) = &self.search {
            let predicate = Expr::any(
                self.search_columns
                    .iter()
                    .map(|column| column.clone().contains_ci(term)),
            );
            if let Some(predicate) = predicate {
                sql.push_str(" WHERE ");
                sql.push_str(&predicate.build_with_dialect(dialect, &mut params, 0));
            }
        }

        let mut no_params = Vec::new();
        sql.push_str(" GROUP BY ");
        sql.push_str(
            &self
                .primary_key()
                .build_with_dialect(dialect, &mut no_params, 0),
        );

        let keys: Vec<_> = self
            .effective_order()
            .iter()
            .map(|o| o.to_sql(dialect))
            .collect();
        sql.push_str(" ORDER BY ");
        sql.push_str(&keys.join(", "));

        (sql, params)
    }

    /// Statement fetching the linked rows of one primary row.
    ///
    /// Takes the primary key as its single parameter.
    pub fn association_query(&self, dialect: Dialect) -> String {
        let remote = self.link.remote;
        let link_table = dialect.quote_identifier(self.link.table);
        let remote_table = dialect.quote_identifier(remote.name);
        format!(
            "SELECT {} FROM {remote_table} \
             INNER JOIN {link_table} ON {link_table}.{} = {remote_table}.{} \
             WHERE {link_table}.{} = {} ORDER BY {}",
            column_list(remote, dialect),
            dialect.quote_identifier(self.link.remote_column),
            dialect.quote_identifier(remote.primary_key),
            dialect.quote_identifier(self.link.local_column),
            dialect.placeholder(1),
            OrderBy::asc(Expr::qualified(remote.name, remote.primary_key)).to_sql(dialect),
        )
    }
}

/// Statement reading the remote keys currently linked to one local row.
///
/// Takes the local key as its single parameter.
pub fn linked_keys_query(link: &LinkTableInfo, dialect: Dialect) -> String {
    format!(
        "SELECT {} FROM {} WHERE {} = {}",
        dialect.quote_identifier(link.remote_column),
        dialect.quote_identifier(link.table),
        dialect.quote_identifier(link.local_column),
        dialect.placeholder(1)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    static FILMS: TableInfo = TableInfo {
        name: "films",
        primary_key: "id",
        columns: &["id", "title", "rating"],
    };
    static ACTORS: TableInfo = TableInfo {
        name: "actors",
        primary_key: "id",
        columns: &["id", "first_name", "last_name", "middle_name"],
    };
    static FILM_ACTORS: LinkTableInfo = LinkTableInfo {
        table: "actors_and_films",
        local_column: "film_id",
        remote_column: "actor_id",
        remote: &ACTORS,
    };

    fn films() -> Listing {
        Listing::new(&FILMS, &FILM_ACTORS)
            .search_in(&FILMS, &["title"])
            .search_in(&ACTORS, &["first_name", "last_name", "middle_name"])
            .default_order(OrderBy::desc(Expr::qualified("films", "rating")))
    }

    const JOINS: &str = "SELECT \"films\".\"id\", \"films\".\"title\", \"films\".\"rating\" \
        FROM \"films\" \
        LEFT JOIN \"actors_and_films\" ON \"actors_and_films\".\"film_id\" = \"films\".\"id\" \
        LEFT JOIN \"actors\" ON \"actors\".\"id\" = \"actors_and_films\".\"actor_id\"";

    #[test]
    fn test_default_order_by_rating_desc() {
        let (sql, params) = films().build_with_dialect(Dialect::Sqlite);
        assert_eq!(
            sql,
            format!(
                "{JOINS} GROUP BY \"films\".\"id\" \
                 ORDER BY \"films\".\"rating\" DESC, \"films\".\"id\" ASC"
            )
        );
        assert!(params.is_empty());
    }

    #[test]
    fn test_explicit_order_replaces_default() {
        let orders = OrderBy::parse_list("title,-rating", &FILMS).unwrap();
        let (sql, _) = films().order_by(orders).build_with_dialect(Dialect::Sqlite);
        assert!(sql.ends_with(
            "ORDER BY \"films\".\"title\" ASC, \"films\".\"rating\" DESC, \"films\".\"id\" ASC"
        ));
    }

    #[test]
    fn test_order_on_primary_key_has_no_tiebreaker() {
        let orders = OrderBy::parse_list("-id", &FILMS).unwrap();
        let (sql, _) = films().order_by(orders).build_with_dialect(Dialect::Sqlite);
        assert!(sql.ends_with("ORDER BY \"films\".\"id\" DESC"));
    }

    #[test]
    fn test_search_binds_term_per_column() {
        let (sql, params) = films()
            .search(Some("ann"))
            .build_with_dialect(Dialect::Sqlite);
        assert!(sql.contains(
            "WHERE (unicode_lower(\"films\".\"title\") LIKE unicode_lower(?1) ESCAPE '\\' \
             OR unicode_lower(\"actors\".\"first_name\") LIKE unicode_lower(?2) ESCAPE '\\' \
             OR unicode_lower(\"actors\".\"last_name\") LIKE unicode_lower(?3) ESCAPE '\\' \
             OR unicode_lower(\"actors\".\"middle_name\") LIKE unicode_lower(?4) ESCAPE '\\') \
             GROUP BY"
        ));
        assert_eq!(params, vec![Value::Text("%ann%".into()); 4]);
    }

    #[test]
    fn test_blank_search_is_ignored() {
        let (sql, params) = films().search(Some("  ")).build_with_dialect(Dialect::Sqlite);
        assert!(!sql.contains("WHERE"));
        assert!(params.is_empty());
    }

    #[test]
    fn test_association_query() {
        assert_eq!(
            films().association_query(Dialect::Sqlite),
            "SELECT \"actors\".\"id\", \"actors\".\"first_name\", \"actors\".\"last_name\", \
             \"actors\".\"middle_name\" FROM \"actors\" \
             INNER JOIN \"actors_and_films\" ON \"actors_and_films\".\"actor_id\" = \"actors\".\"id\" \
             WHERE \"actors_and_films\".\"film_id\" = ?1 ORDER BY \"actors\".\"id\" ASC"
        );
    }

    #[test]
    fn test_linked_keys_query() {
        assert_eq!(
            linked_keys_query(&FILM_ACTORS, Dialect::Sqlite),
            "SELECT \"actor_id\" FROM \"actors_and_films\" WHERE \"film_id\" = ?1"
        );
    }
}
