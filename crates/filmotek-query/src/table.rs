//! Static table metadata consumed by the builders.

/// Description of one stored table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableInfo {
    /// Table name
    pub name: &'static str,
    /// Single-column primary key
    pub primary_key: &'static str,
    /// Every column, primary key first
    pub columns: &'static [&'static str],
}

impl TableInfo {
    /// Does the table declare this column?
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.contains(&column)
    }
}

/// A many-to-many association through a link table.
///
/// Seen from the `local` side: `local_column` references the local table's
/// primary key and `remote_column` references `remote.primary_key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkTableInfo {
    /// Link table name
    pub table: &'static str,
    /// Link column pointing at the local row
    pub local_column: &'static str,
    /// Link column pointing at the remote row
    pub remote_column: &'static str,
    /// Table on the other side of the link
    pub remote: &'static TableInfo,
}

impl LinkTableInfo {
    /// The same link table seen from the remote side.
    pub const fn reversed(&self, local: &'static TableInfo) -> LinkTableInfo {
        LinkTableInfo {
            table: self.table,
            local_column: self.remote_column,
            remote_column: self.local_column,
            remote: local,
        }
    }
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
        columns: &["id", "first_name"],
    };

    #[test]
    fn test_has_column() {
        assert!(FILMS.has_column("rating"));
        assert!(!FILMS.has_column("first_name"));
    }

    #[test]
    fn test_reversed_link() {
        let link = LinkTableInfo {
            table: "actors_and_films",
            local_column: "film_id",
            remote_column: "actor_id",
            remote: &ACTORS,
        };
        let back = link.reversed(&FILMS);
        assert_eq!(back.local_column, "actor_id");
        assert_eq!(back.remote_column, "film_id");
        assert_eq!(back.remote.name, "films");
    }
}
