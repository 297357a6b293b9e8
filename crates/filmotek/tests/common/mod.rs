//! Shared SQLite fixture for the catalog integration tests.

#![allow(dead_code)]

use asupersync::runtime::RuntimeBuilder;
use filmotek::{
    AddActor, AddFilm, Catalog, CatalogConfig, Cx, Date, Error, Outcome, Sex, SqliteConnection,
};

pub const SCHEMA: &str = "
CREATE TABLE users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    password TEXT NOT NULL,
    is_admin INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE actors (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    middle_name TEXT,
    sex TEXT NOT NULL CHECK (sex IN ('male', 'female')),
    birthday TEXT NOT NULL
);
CREATE TABLE films (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    release_date TEXT NOT NULL,
    rating INTEGER NOT NULL CHECK (rating BETWEEN 0 AND 10)
);
CREATE TABLE actors_and_films (
    film_id INTEGER NOT NULL REFERENCES films (id) ON DELETE CASCADE,
    actor_id INTEGER NOT NULL REFERENCES actors (id) ON DELETE CASCADE,
    PRIMARY KEY (film_id, actor_id)
);
";

pub fn block_on<F: std::future::Future>(f: F) -> F::Output {
    RuntimeBuilder::current_thread()
        .build()
        .expect("create asupersync runtime")
        .block_on(f)
}

pub fn unwrap_outcome<T>(outcome: Outcome<T, Error>) -> T {
    match outcome {
        Outcome::Ok(v) => v,
        Outcome::Err(e) => panic!("unexpected error: {e}"),
        Outcome::Cancelled(r) => panic!("cancelled: {r:?}"),
        Outcome::Panicked(p) => panic!("panicked: {p:?}"),
    }
}

pub fn expect_err<T: std::fmt::Debug>(outcome: Outcome<T, Error>) -> Error {
    match outcome {
        Outcome::Err(e) => e,
        other => panic!("expected an error, got {other:?}"),
    }
}

/// A fresh in-memory catalog with the schema applied.
pub fn catalog() -> Catalog<SqliteConnection> {
    let catalog = Catalog::open(&CatalogConfig::default()).expect("open sqlite memory db");
    catalog
        .connection()
        .execute_raw(SCHEMA)
        .expect("apply schema");
    catalog
}

pub fn date(s: &str) -> Date {
    s.parse().expect("valid dd-mm-yyyy date")
}

pub fn actor(first: &str, middle: Option<&str>, last: &str) -> AddActor {
    AddActor {
        first_name: first.to_string(),
        last_name: last.to_string(),
        middle_name: middle.map(str::to_string),
        sex: Sex::Male,
        birthday: date("17-08-1943"),
    }
}

pub fn film(title: &str, rating: u8, actors_ids: Vec<i64>) -> AddFilm {
    AddFilm {
        title: title.to_string(),
        description: format!("{title} description"),
        release_date: date("15-12-1995"),
        rating,
        actors_ids,
    }
}

/// Insert four actors, returning their ids in insertion order.
pub async fn seed_actors(catalog: &Catalog<SqliteConnection>, cx: &Cx) -> Vec<i64> {
    let actors = catalog.actors();
    let mut ids = Vec::new();
    for request in [
        actor("Robert", Some("Anthony"), "De Niro"),
        actor("Al", None, "Pacino"),
        actor("Val", Some("Edward"), "Kilmer"),
        actor("Jon", None, "Voight"),
    ] {
        ids.push(unwrap_outcome(actors.create(cx, &request).await).id);
    }
    ids
}

/// Actor ids currently linked to `film_id`, ascending.
pub async fn linked_actors(catalog: &Catalog<SqliteConnection>, cx: &Cx, film_id: i64) -> Vec<i64> {
    let films = unwrap_outcome(catalog.films().list(cx, &Default::default()).await);
    films
        .into_iter()
        .find(|f| f.film.id == film_id)
        .map(|f| f.actors.into_iter().map(|a| a.id).collect())
        .unwrap_or_default()
}
