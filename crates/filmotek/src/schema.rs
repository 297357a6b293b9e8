//! Stored tables of the catalog.
//!
//! Column lists double as the whitelist for `sortBy` keys and for the
//! columns a change-set may write.

use filmotek_query::{LinkTableInfo, TableInfo};

pub static USERS: TableInfo = TableInfo {
    name: "users",
    primary_key: "id",
    columns: &["id", "username", "password", "is_admin"],
};

pub static ACTORS: TableInfo = TableInfo {
    name: "actors",
    primary_key: "id",
    columns: &[
        "id",
        "first_name",
        "last_name",
        "middle_name",
        "sex",
        "birthday",
    ],
};

pub static FILMS: TableInfo = TableInfo {
    name: "films",
    primary_key: "id",
    columns: &["id", "title", "description", "release_date", "rating"],
};

/// Actors of a film.
pub static FILM_ACTORS: LinkTableInfo = LinkTableInfo {
    table: "actors_and_films",
    local_column: "film_id",
    remote_column: "actor_id",
    remote: &ACTORS,
};

/// Films of an actor.
pub static ACTOR_FILMS: LinkTableInfo = FILM_ACTORS.reversed(&FILMS);
