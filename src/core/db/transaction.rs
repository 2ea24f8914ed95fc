/// Transaction Module
///
/// Groups statements on one connection into an all-or-nothing unit.
/// `commit` and `rollback` consume the transaction, so a finished
/// transaction cannot be used again. A failing statement does not end the
/// transaction; the caller chooses whether to roll back.

use crate::core::db::query::{ExecResult, QueryExecutor};
use crate::core::db::statement::PreparedStatement;
use crate::core::Result;
use rusqlite::{Connection, Params, Row};
use tracing::{debug, warn};

/// Represents database transaction states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    /// Every statement so far succeeded
    Active,
    /// At least one statement failed; the transaction is still open
    Failed,
}

/// An open transaction on a borrowed connection
#[derive(Debug)]
pub struct Transaction<'conn> {
    tx: rusqlite::Transaction<'conn>,
    state: TransactionState,
    statements: usize,
}

/// Starts a deferred transaction on the connection
///
/// The connection is borrowed mutably until the transaction is committed or
/// rolled back, so no statement can bypass it. Dropping the transaction
/// without finishing it rolls it back.
pub fn begin(conn: &mut Connection) -> Result<Transaction<'_>> {
    let tx = conn.transaction()?;
    debug!("Began transaction");
    Ok(Transaction {
        tx,
        state: TransactionState::Active,
        statements: 0,
    })
}

impl<'conn> Transaction<'conn> {
    /// Current state of the transaction
    pub fn state(&self) -> TransactionState {
        self.state
    }

    /// Number of statements executed inside the transaction
    pub fn statements(&self) -> usize {
        self.statements
    }

    /// The connection statements run on; anything executed through it
    /// joins this transaction
    pub fn connection(&self) -> &Connection {
        &self.tx
    }

    /// Executes a write statement inside the transaction
    pub fn execute<P: Params>(&mut self, sql: &str, params: P) -> Result<ExecResult> {
        let outcome = QueryExecutor::new(&self.tx).execute(sql, params);
        self.track(outcome)
    }

    /// Runs a mapped query inside the transaction
    pub fn query_map<T, P, F>(&mut self, sql: &str, params: P, f: F) -> Result<Vec<T>>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let outcome = QueryExecutor::new(&self.tx).query_map(sql, params, f);
        self.track(outcome)
    }

    /// Prepares a statement that runs inside the transaction
    pub fn prepare(&self, sql: &str) -> Result<PreparedStatement<'_>> {
        PreparedStatement::prepare(&self.tx, sql)
    }

    /// Makes every write in the transaction visible
    pub fn commit(self) -> Result<()> {
        let statements = self.statements;
        self.tx.commit()?;
        debug!(statements, "Committed transaction");
        Ok(())
    }

    /// Discards every write in the transaction
    pub fn rollback(self) -> Result<()> {
        let statements = self.statements;
        self.tx.rollback()?;
        debug!(statements, "Rolled back transaction");
        Ok(())
    }

    fn track<T>(&mut self, outcome: Result<T>) -> Result<T> {
        self.statements += 1;
        if let Err(e) = &outcome {
            warn!(error = %e, statement = self.statements, "Statement failed inside transaction");
            self.state = TransactionState::Failed;
        }
        outcome
    }
}
