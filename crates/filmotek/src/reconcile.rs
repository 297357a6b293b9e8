//! Reconciliation of a many-to-many association to a desired set.
//!
//! The stored link rows of one local row are read, diffed against the
//! desired remote identities, and only the difference is written: missing
//! links are inserted, surplus links deleted, shared links left alone.
//! Everything runs on the caller's transaction.

use filmotek_core::{Cx, Dialect, EntityKind, Error, Outcome, TransactionOps, Value};
use filmotek_query::{DeleteBuilder, Expr, InsertBuilder, LinkTableInfo, linked_keys_query};
use std::collections::BTreeSet;

/// Link rows to insert and delete, in ascending identity order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationDiff {
    pub insert: Vec<i64>,
    pub delete: Vec<i64>,
}

impl RelationDiff {
    /// `insert = desired - current`, `delete = current - desired`.
    pub fn plan(current: &BTreeSet<i64>, desired: &BTreeSet<i64>) -> Self {
        Self {
            insert: desired.difference(current).copied().collect(),
            delete: current.difference(desired).copied().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.insert.is_empty() && self.delete.is_empty()
    }
}

/// Keeps one link table in step with desired remote sets.
#[derive(Debug, Clone, Copy)]
pub struct RelationReconciler {
    dialect: Dialect,
    link: &'static LinkTableInfo,
    remote: EntityKind,
}

impl RelationReconciler {
    /// `remote` names the kind of row on the far side of `link`, used when a
    /// link references a missing row.
    pub const fn new(dialect: Dialect, link: &'static LinkTableInfo, remote: EntityKind) -> Self {
        Self {
            dialect,
            link,
            remote,
        }
    }

    /// Remote identities currently linked to `local`.
    pub async fn current<Tx: TransactionOps>(
        &self,
        tx: &Tx,
        cx: &Cx,
        local: i64,
    ) -> Outcome<BTreeSet<i64>, Error> {
        let sql = linked_keys_query(self.link, self.dialect);
        let rows = try_outcome!(tx.query(cx, &sql, &[Value::BigInt(local)]).await);

        let mut ids = BTreeSet::new();
        for row in &rows {
            match row.get_as::<i64>(0) {
                Ok(id) => {
                    ids.insert(id);
                }
                Err(e) => return Outcome::Err(e),
            }
        }
        Outcome::Ok(ids)
    }

    /// Make the links of `local` equal to `desired`, writing only the diff.
    #[tracing::instrument(
        level = "debug",
        skip(self, tx, cx, desired),
        fields(link = self.link.table)
    )]
    pub async fn reconcile<Tx: TransactionOps>(
        &self,
        tx: &Tx,
        cx: &Cx,
        local: i64,
        desired: &[i64],
    ) -> Outcome<RelationDiff, Error> {
        let current = try_outcome!(self.current(tx, cx, local).await);
        let desired: BTreeSet<i64> = desired.iter().copied().collect();
        let diff = RelationDiff::plan(&current, &desired);

        for &remote in &diff.insert {
            try_outcome!(self.insert_link(tx, cx, local, remote).await);
        }
        for &remote in &diff.delete {
            try_outcome!(self.delete_link(tx, cx, local, remote).await);
        }

        tracing::info!(
            local,
            inserted = diff.insert.len(),
            deleted = diff.delete.len(),
            unchanged = current.len() - diff.delete.len(),
            "Reconciled links"
        );
        Outcome::Ok(diff)
    }

    /// Link every id of `remotes` to a freshly created `local` row.
    #[tracing::instrument(
        level = "debug",
        skip(self, tx, cx, remotes),
        fields(link = self.link.table)
    )]
    pub async fn link_all<Tx: TransactionOps>(
        &self,
        tx: &Tx,
        cx: &Cx,
        local: i64,
        remotes: &[i64],
    ) -> Outcome<(), Error> {
        let remotes: BTreeSet<i64> = remotes.iter().copied().collect();
        for &remote in &remotes {
            try_outcome!(self.insert_link(tx, cx, local, remote).await);
        }
        tracing::info!(local, inserted = remotes.len(), "Linked new row");
        Outcome::Ok(())
    }

    async fn insert_link<Tx: TransactionOps>(
        &self,
        tx: &Tx,
        cx: &Cx,
        local: i64,
        remote: i64,
    ) -> Outcome<(), Error> {
        let (sql, params) = InsertBuilder::new(self.link.table)
            .value(self.link.local_column, local)
            .value(self.link.remote_column, remote)
            .build_with_dialect(self.dialect);

        match tx.execute(cx, &sql, &params).await {
            Outcome::Ok(_) => Outcome::Ok(()),
            Outcome::Err(e) if e.is_foreign_key_violation() => {
                tracing::warn!(
                    table = self.remote.table(),
                    id = remote,
                    "Link references a missing row"
                );
                Outcome::Err(Error::not_found(self.remote, remote))
            }
            Outcome::Err(e) => Outcome::Err(e),
            Outcome::Cancelled(r) => Outcome::Cancelled(r),
            Outcome::Panicked(p) => Outcome::Panicked(p),
        }
    }

    async fn delete_link<Tx: TransactionOps>(
        &self,
        tx: &Tx,
        cx: &Cx,
        local: i64,
        remote: i64,
    ) -> Outcome<(), Error> {
        let (sql, params) = DeleteBuilder::new(self.link.table)
            .filter(Expr::col(self.link.local_column).eq(local))
            .filter(Expr::col(self.link.remote_column).eq(remote))
            .build_with_dialect(self.dialect);
        try_outcome!(tx.execute(cx, &sql, &params).await);
        Outcome::Ok(())
    }
}
