//! Film mutations and the film listing.

use crate::changeset::{ChangeSet, IntoChangeSet};
use crate::executor::{MutationExecutor, finish};
use crate::model::{Actor, Film, FilmWithActors};
use crate::reconcile::RelationReconciler;
use crate::request::{AddFilm, ListQuery, PartialUpdateFilm, UpdateFilm};
use crate::schema::{ACTORS, FILM_ACTORS, FILMS};
use crate::validate::Validate;
use filmotek_core::{Connection, Cx, EntityKind, Error, Outcome, Result, TransactionOps, Value};
use filmotek_query::{Expr, Listing, OrderBy};

/// Film operations over one connection.
///
/// Every mutation runs in its own transaction. A film update writes the
/// scalar change-set first and then reconciles the actor set, on the same
/// transaction.
pub struct FilmRepository<'a, C: Connection> {
    conn: &'a C,
    default_sort: &'a [OrderBy],
    executor: MutationExecutor,
    actors: RelationReconciler,
}

impl<'a, C: Connection> FilmRepository<'a, C> {
    /// `default_sort` orders listings that name no `sortBy`; when empty,
    /// films are ordered by rating, highest first.
    pub fn new(conn: &'a C, default_sort: &'a [OrderBy]) -> Self {
        let dialect = conn.dialect();
        Self {
            conn,
            default_sort,
            executor: MutationExecutor::new(dialect, EntityKind::Film, &FILMS),
            actors: RelationReconciler::new(dialect, &FILM_ACTORS, EntityKind::Actor),
        }
    }

    /// Insert a film and link its actors.
    #[tracing::instrument(level = "info", skip(self, cx, request), fields(title = %request.title))]
    pub async fn create(&self, cx: &Cx, request: &AddFilm) -> Outcome<Film, Error> {
        try_result!(request.validate());

        let tx = try_outcome!(self.conn.begin(cx).await);
        let outcome = self.create_in(&tx, cx, request).await;
        finish(tx, cx, outcome).await
    }

    async fn create_in<Tx: TransactionOps>(
        &self,
        tx: &Tx,
        cx: &Cx,
        request: &AddFilm,
    ) -> Outcome<Film, Error> {
        let id = try_outcome!(self.executor.insert(tx, cx, request.change_set()).await);
        try_outcome!(self.actors.link_all(tx, cx, id, &request.actors_ids).await);
        tracing::info!(id, actors = request.actors_ids.len(), "Film created");

        Outcome::Ok(Film {
            id,
            title: request.title.clone(),
            description: request.description.clone(),
            release_date: request.release_date,
            rating: request.rating,
        })
    }

    /// Replace every attribute and the actor set of a film.
    #[tracing::instrument(level = "info", skip(self, cx, request))]
    pub async fn update(&self, cx: &Cx, id: i64, request: &UpdateFilm) -> Outcome<(), Error> {
        try_result!(request.validate());
        let changes = request.change_set();

        let tx = try_outcome!(self.conn.begin(cx).await);
        let outcome = self
            .write(&tx, cx, id, &changes, Some(&request.actors_ids))
            .await;
        finish(tx, cx, outcome).await
    }

    /// Write the provided attributes and, if given, replace the actor set.
    ///
    /// A request that provides nothing succeeds without touching storage.
    #[tracing::instrument(level = "info", skip(self, cx, request))]
    pub async fn partial_update(
        &self,
        cx: &Cx,
        id: i64,
        request: &PartialUpdateFilm,
    ) -> Outcome<(), Error> {
        try_result!(request.validate());
        let changes = request.change_set();
        let desired = request.actors_ids.value().map(Vec::as_slice);

        if changes.is_empty() && desired.is_none() {
            tracing::debug!("Nothing to update");
            return Outcome::Ok(());
        }

        let tx = try_outcome!(self.conn.begin(cx).await);
        let outcome = self.write(&tx, cx, id, &changes, desired).await;
        finish(tx, cx, outcome).await
    }

    async fn write<Tx: TransactionOps>(
        &self,
        tx: &Tx,
        cx: &Cx,
        id: i64,
        changes: &ChangeSet,
        desired: Option<&[i64]>,
    ) -> Outcome<(), Error> {
        // Without a scalar write nothing else would notice a missing film
        // before the link inserts fail on it.
        if changes.is_empty() && desired.is_some() {
            try_outcome!(self.executor.ensure_exists(tx, cx, id).await);
        }

        try_outcome!(self.executor.apply_scalar_update(tx, cx, id, changes).await);

        if let Some(desired) = desired {
            try_outcome!(self.actors.reconcile(tx, cx, id, desired).await);
        }
        Outcome::Ok(())
    }

    /// Delete a film; its actor links go with it.
    #[tracing::instrument(level = "info", skip(self, cx))]
    pub async fn remove(&self, cx: &Cx, id: i64) -> Outcome<(), Error> {
        let tx = try_outcome!(self.conn.begin(cx).await);
        let outcome = self.executor.remove(&tx, cx, id).await;
        finish(tx, cx, outcome).await
    }

    fn listing(&self, query: &ListQuery) -> Result<Listing> {
        let orders = match query.sort_by.as_deref().map(str::trim) {
            Some(sort) if !sort.is_empty() => OrderBy::parse_list(sort, &FILMS)?,
            _ => self.default_sort.to_vec(),
        };

        Ok(Listing::new(&FILMS, &FILM_ACTORS)
            .search_in(&FILMS, &["title"])
            .search_in(&ACTORS, &["first_name", "last_name", "middle_name"])
            .search(query.search.as_deref())
            .default_order(OrderBy::desc(Expr::qualified(FILMS.name, "rating")))
            .order_by(orders))
    }

    /// Films with their actors, optionally searched and sorted.
    ///
    /// The film rows and each film's actors are read by separate
    /// statements outside any transaction.
    #[tracing::instrument(level = "debug", skip(self, cx))]
    pub async fn list(&self, cx: &Cx, query: &ListQuery) -> Outcome<Vec<FilmWithActors>, Error> {
        let listing = try_result!(self.listing(query));
        let dialect = self.conn.dialect();

        let (sql, params) = listing.build_with_dialect(dialect);
        tracing::debug!(sql = %sql, "Listing films");
        let rows = try_outcome!(self.conn.query(cx, &sql, &params).await);

        let actors_sql = listing.association_query(dialect);
        let mut films = Vec::with_capacity(rows.len());
        for row in &rows {
            let film = try_result!(Film::from_row(row));
            let actor_rows = try_outcome!(
                self.conn
                    .query(cx, &actors_sql, &[Value::BigInt(film.id)])
                    .await
            );
            let actors = try_result!(
                actor_rows
                    .iter()
                    .map(Actor::from_row)
                    .collect::<Result<Vec<_>>>()
            );
            films.push(FilmWithActors { film, actors });
        }

        Outcome::Ok(films)
    }
}
