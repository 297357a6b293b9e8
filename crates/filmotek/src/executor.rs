//! Identity-scoped writes: scalar update, removal and existence checks.

use crate::changeset::ChangeSet;
use filmotek_core::{
    Cx, Dialect, EntityKind, Error, InvariantError, Outcome, TransactionOps, Value,
};
use filmotek_query::{DeleteBuilder, Expr, InsertBuilder, Select, TableInfo, UpdateBuilder};

/// Applies change-sets and removals to one table, keyed by identity.
#[derive(Debug, Clone, Copy)]
pub struct MutationExecutor {
    dialect: Dialect,
    entity: EntityKind,
    table: &'static TableInfo,
}

impl MutationExecutor {
    pub const fn new(dialect: Dialect, entity: EntityKind, table: &'static TableInfo) -> Self {
        Self {
            dialect,
            entity,
            table,
        }
    }

    pub const fn entity(&self) -> EntityKind {
        self.entity
    }

    fn identity(&self, id: i64) -> Expr {
        Expr::col(self.table.primary_key).eq(id)
    }

    /// Exactly one row must be affected by an identity-scoped statement.
    fn check_affected(&self, id: i64, rows_affected: u64) -> Outcome<(), Error> {
        match rows_affected {
            1 => Outcome::Ok(()),
            0 => {
                tracing::warn!(table = self.table.name, id, "No row with this identity");
                Outcome::Err(Error::not_found(self.entity, id))
            }
            n => {
                tracing::error!(
                    table = self.table.name,
                    id,
                    rows_affected = n,
                    "Identity-scoped mutation affected more than one row"
                );
                Outcome::Err(Error::Invariant(InvariantError {
                    table: self.table.name,
                    identity: id.to_string(),
                    rows_affected: n,
                }))
            }
        }
    }

    /// Write `changes` to the row with identity `id`.
    ///
    /// An empty change-set succeeds without issuing a statement.
    #[tracing::instrument(
        level = "debug",
        skip(self, tx, cx, changes),
        fields(table = self.table.name, columns = changes.len())
    )]
    pub async fn apply_scalar_update<Tx: TransactionOps>(
        &self,
        tx: &Tx,
        cx: &Cx,
        id: i64,
        changes: &ChangeSet,
    ) -> Outcome<(), Error> {
        if changes.is_empty() {
            tracing::debug!("Empty change-set, nothing to write");
            return Outcome::Ok(());
        }

        if let Some(column) = changes.columns().find(|c| !self.table.has_column(c)) {
            return Outcome::Err(Error::Custom(format!(
                "column '{}' is not part of table '{}'",
                column, self.table.name
            )));
        }

        let (sql, params) = UpdateBuilder::new(self.table.name)
            .set_all(changes.iter().map(|(c, v)| (c, v.clone())))
            .filter(self.identity(id))
            .build_with_dialect(self.dialect);
        tracing::debug!(sql = %sql, "Applying scalar update");

        let affected = try_outcome!(tx.execute(cx, &sql, &params).await);
        self.check_affected(id, affected)
    }

    /// Delete the row with identity `id`.
    #[tracing::instrument(level = "debug", skip(self, tx, cx), fields(table = self.table.name))]
    pub async fn remove<Tx: TransactionOps>(
        &self,
        tx: &Tx,
        cx: &Cx,
        id: i64,
    ) -> Outcome<(), Error> {
        let (sql, params) = DeleteBuilder::new(self.table.name)
            .filter(self.identity(id))
            .build_with_dialect(self.dialect);
        tracing::debug!(sql = %sql, "Removing row");

        let affected = try_outcome!(tx.execute(cx, &sql, &params).await);
        self.check_affected(id, affected)
    }

    /// Insert a new row from `changes`, returning its identity.
    #[tracing::instrument(
        level = "debug",
        skip(self, tx, cx, changes),
        fields(table = self.table.name)
    )]
    pub async fn insert<Tx: TransactionOps>(
        &self,
        tx: &Tx,
        cx: &Cx,
        changes: ChangeSet,
    ) -> Outcome<i64, Error> {
        let (sql, params) = InsertBuilder::new(self.table.name)
            .values(changes)
            .build_with_dialect(self.dialect);
        tracing::debug!(sql = %sql, "Inserting row");
        tx.insert(cx, &sql, &params).await
    }

    /// Does a row with identity `id` exist?
    pub async fn exists<Tx: TransactionOps>(
        &self,
        tx: &Tx,
        cx: &Cx,
        id: i64,
    ) -> Outcome<bool, Error> {
        let (sql, params) =
            Select::by_key(self.table, Value::BigInt(id)).build_with_dialect(self.dialect);
        let row = try_outcome!(tx.query_one(cx, &sql, &params).await);
        Outcome::Ok(row.is_some())
    }

    /// Fail with not-found unless a row with identity `id` exists.
    pub async fn ensure_exists<Tx: TransactionOps>(
        &self,
        tx: &Tx,
        cx: &Cx,
        id: i64,
    ) -> Outcome<(), Error> {
        if try_outcome!(self.exists(tx, cx, id).await) {
            Outcome::Ok(())
        } else {
            tracing::warn!(table = self.table.name, id, "No row with this identity");
            Outcome::Err(Error::not_found(self.entity, id))
        }
    }
}

/// Commit `tx` if `outcome` succeeded, otherwise roll it back, and hand the
/// outcome back to the caller.
pub async fn finish<Tx: TransactionOps, T>(
    tx: Tx,
    cx: &Cx,
    outcome: Outcome<T, Error>,
) -> Outcome<T, Error> {
    match outcome {
        Outcome::Ok(value) => {
            try_outcome!(tx.commit(cx).await);
            Outcome::Ok(value)
        }
        failed => {
            if let Outcome::Err(e) = tx.rollback(cx).await {
                tracing::warn!(error = %e, "Rollback failed");
            }
            failed
        }
    }
}
