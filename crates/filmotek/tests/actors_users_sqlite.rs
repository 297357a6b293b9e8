mod common;

use common::{
    actor, block_on, catalog, date, expect_err, film, seed_actors, unwrap_outcome, SCHEMA,
};
use filmotek::{
    Catalog, CatalogConfig, CreateUser, Cx, EntityKind, Error, ListQuery, PartialUpdateActor,
    Patch, Sex, UpdateActor,
};

#[test]
fn partial_update_clears_middle_name_only() {
    let catalog = catalog();
    let cx = Cx::for_testing();

    block_on(async {
        let actors = catalog.actors();
        let val = unwrap_outcome(actors.create(&cx, &actor("Val", Some("Edward"), "Kilmer")).await);

        let request = PartialUpdateActor {
            middle_name: Patch::Null,
            ..Default::default()
        };
        unwrap_outcome(actors.partial_update(&cx, val.id, &request).await);

        let listed = unwrap_outcome(actors.list(&cx, &ListQuery::default()).await);
        assert_eq!(listed[0].actor.middle_name, None);
        assert_eq!(listed[0].actor.first_name, "Val");
        assert_eq!(listed[0].actor.birthday, val.birthday);
    });
}

#[test]
fn null_for_required_attribute_is_rejected() {
    let catalog = catalog();
    let cx = Cx::for_testing();

    block_on(async {
        let actors = catalog.actors();
        let val = unwrap_outcome(actors.create(&cx, &actor("Val", None, "Kilmer")).await);

        let request = PartialUpdateActor {
            last_name: Patch::Null,
            ..Default::default()
        };
        let err = expect_err(actors.partial_update(&cx, val.id, &request).await);
        assert!(matches!(err, Error::Validation(_)));

        let listed = unwrap_outcome(actors.list(&cx, &ListQuery::default()).await);
        assert_eq!(listed[0].actor.last_name, "Kilmer");
    });
}

#[test]
fn full_update_replaces_every_attribute() {
    let catalog = catalog();
    let cx = Cx::for_testing();

    block_on(async {
        let actors = catalog.actors();
        let id = unwrap_outcome(actors.create(&cx, &actor("Robert", Some("Anthony"), "De Niro")).await).id;

        let request = UpdateActor {
            first_name: "Ashley".into(),
            last_name: "Judd".into(),
            middle_name: None,
            sex: Sex::Female,
            birthday: date("19-04-1968"),
        };
        unwrap_outcome(actors.update(&cx, id, &request).await);

        let listed = unwrap_outcome(actors.list(&cx, &ListQuery::default()).await);
        let updated = &listed[0].actor;
        assert_eq!(updated.first_name, "Ashley");
        assert_eq!(updated.middle_name, None);
        assert_eq!(updated.sex, Sex::Female);
        assert_eq!(updated.birthday, date("19-04-1968"));

        match expect_err(actors.update(&cx, id + 100, &request).await) {
            Error::NotFound(e) => assert_eq!(e.entity, EntityKind::Actor),
            other => panic!("expected missing actor, got {other}"),
        }
    });
}

#[test]
fn removing_actor_drops_film_links() {
    let catalog = catalog();
    let cx = Cx::for_testing();

    block_on(async {
        let a = seed_actors(&catalog, &cx).await;
        unwrap_outcome(catalog.films().create(&cx, &film("Heat", 8, vec![a[0], a[1]])).await);

        unwrap_outcome(catalog.actors().remove(&cx, a[0]).await);
        let err = expect_err(catalog.actors().remove(&cx, a[0]).await);
        assert!(err.is_not_found());

        let films = unwrap_outcome(catalog.films().list(&cx, &ListQuery::default()).await);
        let ids: Vec<i64> = films[0].actors.iter().map(|x| x.id).collect();
        assert_eq!(ids, vec![a[1]]);
    });
}

#[test]
fn actor_listing_sorts_and_searches() {
    let catalog = catalog();
    let cx = Cx::for_testing();

    block_on(async {
        let a = seed_actors(&catalog, &cx).await;
        unwrap_outcome(catalog.films().create(&cx, &film("Heat", 8, vec![a[0], a[1]])).await);
        unwrap_outcome(catalog.films().create(&cx, &film("Top Gun", 7, vec![a[2]])).await);
        let actors = catalog.actors();

        let listed = unwrap_outcome(actors.list(&cx, &ListQuery::default()).await);
        let ids: Vec<i64> = listed.iter().map(|x| x.actor.id).collect();
        assert_eq!(ids, a);
        assert_eq!(listed[0].films.len(), 1);
        assert!(listed[3].films.is_empty());

        let listed = unwrap_outcome(actors.list(&cx, &ListQuery::default().sort_by("-lastName")).await);
        let names: Vec<&str> = listed.iter().map(|x| x.actor.last_name.as_str()).collect();
        assert_eq!(names, ["Voight", "Pacino", "Kilmer", "De Niro"]);

        let listed = unwrap_outcome(actors.list(&cx, &ListQuery::default().search("heat")).await);
        let names: Vec<&str> = listed.iter().map(|x| x.actor.first_name.as_str()).collect();
        assert_eq!(names, ["Robert", "Al"]);

        let err = expect_err(actors.list(&cx, &ListQuery::default().sort_by("rating")).await);
        assert!(matches!(err, Error::Validation(_)));
    });
}

#[test]
fn users_are_created_and_found_by_name() {
    let catalog = catalog();
    let cx = Cx::for_testing();

    block_on(async {
        let users = catalog.users();
        let request = CreateUser {
            username: "admin".into(),
            password: "$2a$10$7EqJtq98hPqEX7fNZaFWoO".into(),
            is_admin: true,
        };
        let created = unwrap_outcome(users.create(&cx, &request).await);

        let found = unwrap_outcome(users.get_by_username(&cx, "admin").await);
        assert_eq!(found, created);
        assert!(found.is_admin);

        let json = serde_json::to_value(&found).unwrap();
        assert!(json.get("password").is_none());

        let err = expect_err(users.create(&cx, &request).await);
        assert!(err.is_unique_violation());

        match expect_err(users.get_by_username(&cx, "nobody").await) {
            Error::NotFound(e) => {
                assert_eq!(e.entity, EntityKind::User);
                assert_eq!(e.identity, "nobody");
            }
            other => panic!("expected missing user, got {other}"),
        }
    });
}

#[test]
fn configured_film_sort_is_used_by_default() {
    let config = CatalogConfig::from_lookup(|name| {
        (name == "FILMOTEK_FILM_SORT").then(|| "title".to_string())
    })
    .unwrap();
    let catalog = Catalog::open(&config).unwrap();
    catalog.connection().execute_raw(SCHEMA).unwrap();
    let cx = Cx::for_testing();

    block_on(async {
        let films = catalog.films();
        for (title, rating) in [("Casino", 9), ("Alien", 3)] {
            unwrap_outcome(films.create(&cx, &film(title, rating, vec![])).await);
        }
        let listed = unwrap_outcome(films.list(&cx, &ListQuery::default()).await);
        assert_eq!(listed[0].film.title, "Alien");
    });
}
