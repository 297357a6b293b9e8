//! User registration and lookup.

use crate::changeset::IntoChangeSet;
use crate::executor::{MutationExecutor, finish};
use crate::model::User;
use crate::request::CreateUser;
use crate::schema::USERS;
use crate::validate::Validate;
use filmotek_core::{Connection, Cx, EntityKind, Error, Outcome};
use filmotek_query::{Expr, Select};

pub struct UserRepository<'a, C: Connection> {
    conn: &'a C,
    executor: MutationExecutor,
}

impl<'a, C: Connection> UserRepository<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self {
            conn,
            executor: MutationExecutor::new(conn.dialect(), EntityKind::User, &USERS),
        }
    }

    /// Store a new user. The password must already be hashed.
    ///
    /// A taken username fails with a unique violation from the store.
    #[tracing::instrument(level = "info", skip(self, cx, request), fields(username = %request.username))]
    pub async fn create(&self, cx: &Cx, request: &CreateUser) -> Outcome<User, Error> {
        try_result!(request.validate());

        let tx = try_outcome!(self.conn.begin(cx).await);
        let outcome = self.executor.insert(&tx, cx, request.change_set()).await;
        let id = try_outcome!(finish(tx, cx, outcome).await);

        Outcome::Ok(User {
            id,
            username: request.username.clone(),
            password: request.password.clone(),
            is_admin: request.is_admin,
        })
    }

    #[tracing::instrument(level = "debug", skip(self, cx))]
    pub async fn get_by_username(&self, cx: &Cx, username: &str) -> Outcome<User, Error> {
        let (sql, params) = Select::from(&USERS)
            .filter(Expr::qualified(USERS.name, "username").eq(username))
            .build_with_dialect(self.conn.dialect());

        match try_outcome!(self.conn.query_one(cx, &sql, &params).await) {
            Some(row) => Outcome::Ok(try_result!(User::from_row(&row))),
            None => {
                tracing::warn!(username, "No such user");
                Outcome::Err(Error::not_found(EntityKind::User, username))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockConnection, unwrap_outcome};
    use asupersync::runtime::RuntimeBuilder;
    use filmotek_core::{Row, Value};

    fn run<F: std::future::Future>(f: F) -> F::Output {
        RuntimeBuilder::current_thread()
            .build()
            .expect("create asupersync runtime")
            .block_on(f)
    }

    #[test]
    fn test_unknown_username_is_not_found() {
        let conn = MockConnection::new();
        let cx = Cx::for_testing();
        let outcome = run(async { UserRepository::new(&conn).get_by_username(&cx, "ghost").await });
        match outcome {
            Outcome::Err(err) => {
                assert!(err.is_not_found());
                assert_eq!(err.to_string(), "record not found in users with ghost");
            }
            other => panic!("expected not found, got {other:?}"),
        }
    }

    #[test]
    fn test_lookup_decodes_row() {
        let row = Row::new(
            vec![
                "id".into(),
                "username".into(),
                "password".into(),
                "is_admin".into(),
            ],
            vec![
                Value::Int(1),
                Value::from("admin"),
                Value::from("$2a$10$hash"),
                Value::Int(1),
            ],
        );
        let conn = MockConnection::new().with_rows("FROM \"users\"", vec![row]);
        let cx = Cx::for_testing();
        let user = run(async {
            unwrap_outcome(UserRepository::new(&conn).get_by_username(&cx, "admin").await)
        });
        assert_eq!(user.id, 1);
        assert!(user.is_admin);
        assert_eq!(
            conn.queried(),
            vec![
                "SELECT \"users\".\"id\", \"users\".\"username\", \"users\".\"password\", \
                 \"users\".\"is_admin\" FROM \"users\" WHERE \"users\".\"username\" = ?1"
                    .to_string()
            ]
        );
    }

    #[test]
    fn test_create_inserts_credential_as_given() {
        let conn = MockConnection::new();
        let cx = Cx::for_testing();
        let request = CreateUser {
            username: "critic".into(),
            password: "$2a$10$opaque".into(),
            is_admin: false,
        };
        let user = run(async { unwrap_outcome(UserRepository::new(&conn).create(&cx, &request).await) });
        assert_eq!(user.id, 1);
        assert_eq!(
            conn.executed(),
            vec![(
                "INSERT INTO \"users\" (\"username\", \"password\", \"is_admin\") VALUES (?1, ?2, ?3)"
                    .to_string(),
                vec![
                    Value::from("critic"),
                    Value::from("$2a$10$opaque"),
                    Value::Bool(false),
                ],
            )]
        );
    }
}
