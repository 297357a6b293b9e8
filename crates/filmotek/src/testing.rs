//! Recording connection used by the unit tests.

#![allow(clippy::manual_async_fn)] // Mock trait impls must match trait signatures

use filmotek_core::error::{QueryError, QueryErrorKind, SQLSTATE_FOREIGN_KEY_VIOLATION};
use filmotek_core::{
    Connection, Cx, Dialect, Error, Outcome, Row, TransactionOps, Value,
};
use std::future::Future;
use std::sync::{Arc, Mutex};

pub fn unwrap_outcome<T: std::fmt::Debug>(outcome: Outcome<T, Error>) -> T {
    match outcome {
        Outcome::Ok(v) => v,
        other => std::panic::panic_any(format!("unexpected outcome: {other:?}")),
    }
}

#[derive(Debug, Default)]
struct MockState {
    /// Statements passed to `execute`/`insert`, in order
    executed: Vec<(String, Vec<Value>)>,
    /// Statements passed to `query`/`query_one`, in order
    queried: Vec<String>,
    /// Canned result sets, matched by SQL fragment
    rows: Vec<(String, Vec<Row>)>,
    affected: u64,
    last_id: i64,
    /// `execute` fails with a foreign-key violation when bound to this value
    foreign_key_failure: Option<Value>,
    begun: usize,
    committed: usize,
    rolled_back: usize,
}

impl MockState {
    fn execute(&mut self, sql: &str, params: &[Value]) -> Outcome<u64, Error> {
        if let Some(bad) = &self.foreign_key_failure {
            if params.contains(bad) {
                return Outcome::Err(Error::Query(QueryError {
                    kind: QueryErrorKind::Constraint,
                    sql: Some(sql.to_string()),
                    sqlstate: Some(SQLSTATE_FOREIGN_KEY_VIOLATION.to_string()),
                    message: "FOREIGN KEY constraint failed".to_string(),
                    source: None,
                }));
            }
        }
        self.executed.push((sql.to_string(), params.to_vec()));
        Outcome::Ok(self.affected)
    }

    fn query(&mut self, sql: &str) -> Vec<Row> {
        self.queried.push(sql.to_string());
        self.rows
            .iter()
            .find(|(fragment, _)| sql.contains(fragment.as_str()))
            .map(|(_, rows)| rows.clone())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct MockConnection {
    state: Arc<Mutex<MockState>>,
}

impl MockConnection {
    /// Every statement reports one affected row unless told otherwise.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                affected: 1,
                ..MockState::default()
            })),
        }
    }

    pub fn with_affected(self, affected: u64) -> Self {
        self.state.lock().expect("lock poisoned").affected = affected;
        self
    }

    pub fn with_rows(self, fragment: &str, rows: Vec<Row>) -> Self {
        self.state
            .lock()
            .expect("lock poisoned")
            .rows
            .push((fragment.to_string(), rows));
        self
    }

    pub fn fail_foreign_key(self, value: Value) -> Self {
        self.state.lock().expect("lock poisoned").foreign_key_failure = Some(value);
        self
    }

    pub fn executed(&self) -> Vec<(String, Vec<Value>)> {
        self.state.lock().expect("lock poisoned").executed.clone()
    }

    pub fn queried(&self) -> Vec<String> {
        self.state.lock().expect("lock poisoned").queried.clone()
    }

    /// (begun, committed, rolled back) transaction counts.
    pub fn transactions(&self) -> (usize, usize, usize) {
        let state = self.state.lock().expect("lock poisoned");
        (state.begun, state.committed, state.rolled_back)
    }

    fn tx(&self) -> MockTransaction {
        self.state.lock().expect("lock poisoned").begun += 1;
        MockTransaction {
            state: Arc::clone(&self.state),
        }
    }
}

fn execute(state: &Arc<Mutex<MockState>>, sql: &str, params: &[Value]) -> Outcome<u64, Error> {
    state.lock().expect("lock poisoned").execute(sql, params)
}

fn query(state: &Arc<Mutex<MockState>>, sql: &str) -> Vec<Row> {
    state.lock().expect("lock poisoned").query(sql)
}

fn insert(state: &Arc<Mutex<MockState>>, sql: &str, params: &[Value]) -> Outcome<i64, Error> {
    let mut guard = state.lock().expect("lock poisoned");
    match guard.execute(sql, params) {
        Outcome::Ok(_) => {
            guard.last_id += 1;
            Outcome::Ok(guard.last_id)
        }
        Outcome::Err(e) => Outcome::Err(e),
        Outcome::Cancelled(r) => Outcome::Cancelled(r),
        Outcome::Panicked(p) => Outcome::Panicked(p),
    }
}

impl Connection for MockConnection {
    type Tx<'conn>
        = MockTransaction
    where
        Self: 'conn;

    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn query(
        &self,
        _cx: &Cx,
        sql: &str,
        _params: &[Value],
    ) -> impl Future<Output = Outcome<Vec<Row>, Error>> + Send {
        let rows = query(&self.state, sql);
        async move { Outcome::Ok(rows) }
    }

    fn query_one(
        &self,
        _cx: &Cx,
        sql: &str,
        _params: &[Value],
    ) -> impl Future<Output = Outcome<Option<Row>, Error>> + Send {
        let row = query(&self.state, sql).into_iter().next();
        async move { Outcome::Ok(row) }
    }

    fn execute(
        &self,
        _cx: &Cx,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = Outcome<u64, Error>> + Send {
        let outcome = execute(&self.state, sql, params);
        async move { outcome }
    }

    fn insert(
        &self,
        _cx: &Cx,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = Outcome<i64, Error>> + Send {
        let outcome = insert(&self.state, sql, params);
        async move { outcome }
    }

    fn begin(&self, _cx: &Cx) -> impl Future<Output = Outcome<Self::Tx<'_>, Error>> + Send {
        let tx = self.tx();
        async move { Outcome::Ok(tx) }
    }
}

pub struct MockTransaction {
    state: Arc<Mutex<MockState>>,
}

impl std::fmt::Debug for MockTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MockTransaction")
    }
}

impl TransactionOps for MockTransaction {
    fn query(
        &self,
        _cx: &Cx,
        sql: &str,
        _params: &[Value],
    ) -> impl Future<Output = Outcome<Vec<Row>, Error>> + Send {
        let rows = query(&self.state, sql);
        async move { Outcome::Ok(rows) }
    }

    fn query_one(
        &self,
        _cx: &Cx,
        sql: &str,
        _params: &[Value],
    ) -> impl Future<Output = Outcome<Option<Row>, Error>> + Send {
        let row = query(&self.state, sql).into_iter().next();
        async move { Outcome::Ok(row) }
    }

    fn execute(
        &self,
        _cx: &Cx,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = Outcome<u64, Error>> + Send {
        let outcome = execute(&self.state, sql, params);
        async move { outcome }
    }

    fn insert(
        &self,
        _cx: &Cx,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = Outcome<i64, Error>> + Send {
        let outcome = insert(&self.state, sql, params);
        async move { outcome }
    }

    fn commit(self, _cx: &Cx) -> impl Future<Output = Outcome<(), Error>> + Send {
        self.state.lock().expect("lock poisoned").committed += 1;
        async { Outcome::Ok(()) }
    }

    fn rollback(self, _cx: &Cx) -> impl Future<Output = Outcome<(), Error>> + Send {
        self.state.lock().expect("lock poisoned").rolled_back += 1;
        async { Outcome::Ok(()) }
    }
}
