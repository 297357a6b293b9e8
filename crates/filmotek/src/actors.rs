//! Actor mutations and the actor listing.

use crate::changeset::IntoChangeSet;
use crate::executor::{MutationExecutor, finish};
use crate::model::{Actor, ActorWithFilms, Film};
use crate::request::{AddActor, ListQuery, PartialUpdateActor, UpdateActor};
use crate::schema::{ACTOR_FILMS, ACTORS, FILMS};
use crate::validate::Validate;
use filmotek_core::{Connection, Cx, EntityKind, Error, Outcome, Result, Value};
use filmotek_query::{Expr, Listing, OrderBy};

pub struct ActorRepository<'a, C: Connection> {
    conn: &'a C,
    executor: MutationExecutor,
}

impl<'a, C: Connection> ActorRepository<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self {
            conn,
            executor: MutationExecutor::new(conn.dialect(), EntityKind::Actor, &ACTORS),
        }
    }

    #[tracing::instrument(level = "info", skip(self, cx, request))]
    pub async fn create(&self, cx: &Cx, request: &AddActor) -> Outcome<Actor, Error> {
        try_result!(request.validate());

        let tx = try_outcome!(self.conn.begin(cx).await);
        let outcome = self.executor.insert(&tx, cx, request.change_set()).await;
        let id = try_outcome!(finish(tx, cx, outcome).await);
        tracing::info!(id, "Actor created");

        Outcome::Ok(Actor {
            id,
            first_name: request.first_name.clone(),
            last_name: request.last_name.clone(),
            middle_name: request.middle_name.clone(),
            sex: request.sex,
            birthday: request.birthday,
        })
    }

    /// Replace every attribute; a missing middle name is cleared.
    #[tracing::instrument(level = "info", skip(self, cx, request))]
    pub async fn update(&self, cx: &Cx, id: i64, request: &UpdateActor) -> Outcome<(), Error> {
        try_result!(request.validate());
        let changes = request.change_set();

        let tx = try_outcome!(self.conn.begin(cx).await);
        let outcome = self
            .executor
            .apply_scalar_update(&tx, cx, id, &changes)
            .await;
        finish(tx, cx, outcome).await
    }

    #[tracing::instrument(level = "info", skip(self, cx, request))]
    pub async fn partial_update(
        &self,
        cx: &Cx,
        id: i64,
        request: &PartialUpdateActor,
    ) -> Outcome<(), Error> {
        try_result!(request.validate());
        let changes = request.change_set();
        if changes.is_empty() {
            tracing::debug!("Nothing to update");
            return Outcome::Ok(());
        }

        let tx = try_outcome!(self.conn.begin(cx).await);
        let outcome = self
            .executor
            .apply_scalar_update(&tx, cx, id, &changes)
            .await;
        finish(tx, cx, outcome).await
    }

    /// Delete an actor; the actor's film links go with it.
    #[tracing::instrument(level = "info", skip(self, cx))]
    pub async fn remove(&self, cx: &Cx, id: i64) -> Outcome<(), Error> {
        let tx = try_outcome!(self.conn.begin(cx).await);
        let outcome = self.executor.remove(&tx, cx, id).await;
        finish(tx, cx, outcome).await
    }

    fn listing(query: &ListQuery) -> Result<Listing> {
        let orders = match query.sort_by.as_deref().map(str::trim) {
            Some(sort) if !sort.is_empty() => OrderBy::parse_list(sort, &ACTORS)?,
            _ => Vec::new(),
        };

        Ok(Listing::new(&ACTORS, &ACTOR_FILMS)
            .search_in(&ACTORS, &["first_name", "last_name", "middle_name"])
            .search_in(&FILMS, &["title"])
            .search(query.search.as_deref())
            .default_order(OrderBy::asc(Expr::qualified(ACTORS.name, "id")))
            .order_by(orders))
    }

    /// Actors with their films, optionally searched and sorted.
    #[tracing::instrument(level = "debug", skip(self, cx))]
    pub async fn list(&self, cx: &Cx, query: &ListQuery) -> Outcome<Vec<ActorWithFilms>, Error> {
        let listing = try_result!(Self::listing(query));
        let dialect = self.conn.dialect();

        let (sql, params) = listing.build_with_dialect(dialect);
        tracing::debug!(sql = %sql, "Listing actors");
        let rows = try_outcome!(self.conn.query(cx, &sql, &params).await);

        let films_sql = listing.association_query(dialect);
        let mut actors = Vec::with_capacity(rows.len());
        for row in &rows {
            let actor = try_result!(Actor::from_row(row));
            let film_rows = try_outcome!(
                self.conn
                    .query(cx, &films_sql, &[Value::BigInt(actor.id)])
                    .await
            );
            let films = try_result!(
                film_rows
                    .iter()
                    .map(Film::from_row)
                    .collect::<Result<Vec<_>>>()
            );
            actors.push(ActorWithFilms { actor, films });
        }

        Outcome::Ok(actors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Patch;
    use crate::testing::{MockConnection, unwrap_outcome};
    use asupersync::runtime::RuntimeBuilder;

    fn run<F: std::future::Future>(f: F) -> F::Output {
        RuntimeBuilder::current_thread()
            .build()
            .expect("create asupersync runtime")
            .block_on(f)
    }

    #[test]
    fn test_partial_update_writes_null_middle_name() {
        let conn = MockConnection::new();
        let cx = Cx::for_testing();
        let request = PartialUpdateActor {
            last_name: Patch::Value("De Niro".into()),
            middle_name: Patch::Null,
            ..Default::default()
        };
        run(async {
            let actors = ActorRepository::new(&conn);
            unwrap_outcome(actors.partial_update(&cx, 2, &request).await);
        });
        assert_eq!(
            conn.executed(),
            vec![(
                "UPDATE \"actors\" SET \"last_name\" = ?1, \"middle_name\" = ?2 WHERE \"id\" = ?3"
                    .to_string(),
                vec![Value::from("De Niro"), Value::Null, Value::BigInt(2)],
            )]
        );
        assert_eq!(conn.transactions(), (1, 1, 0));
    }

    #[test]
    fn test_remove_missing_actor() {
        let conn = MockConnection::new().with_affected(0);
        let cx = Cx::for_testing();
        let outcome = run(async { ActorRepository::new(&conn).remove(&cx, 31).await });
        match outcome {
            Outcome::Err(Error::NotFound(e)) => {
                assert_eq!(e.entity, EntityKind::Actor);
                assert_eq!(e.identity, "31");
            }
            other => panic!("expected not found, got {other:?}"),
        }
        assert_eq!(conn.transactions(), (1, 0, 1));
    }

    #[test]
    fn test_default_order_is_identity() {
        let conn = MockConnection::new();
        let cx = Cx::for_testing();
        run(async {
            unwrap_outcome(
                ActorRepository::new(&conn)
                    .list(&cx, &ListQuery::default())
                    .await,
            )
        });
        assert!(conn.queried()[0].ends_with("ORDER BY \"actors\".\"id\" ASC"));
    }
}
