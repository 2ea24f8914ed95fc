/// Prepared Statement Module
///
/// A `PreparedStatement` is parsed once and executed many times with
/// different parameters. Its rows come back through a `RowStream`, a
/// single-pass cursor that borrows the statement, so the statement cannot
/// be run again while a stream is still open.

use crate::core::db::query::{ExecResult, StatementType};
use crate::core::Result;
use rusqlite::{Connection, Params, Row, Rows, Statement};
use tracing::{debug, error};

/// A parsed SQL template bound to positional placeholders
pub struct PreparedStatement<'conn> {
    conn: &'conn Connection,
    stmt: Statement<'conn>,
    kind: StatementType,
    executions: usize,
}

impl<'conn> PreparedStatement<'conn> {
    /// Parses `sql` on the given connection
    ///
    /// # Errors
    ///
    /// Returns `DbPrimerError::Query` if the SQL cannot be compiled (syntax
    /// error, unknown table or column).
    pub fn prepare(conn: &'conn Connection, sql: &str) -> Result<Self> {
        debug!(sql, "Preparing statement");
        let stmt = conn.prepare(sql)?;
        Ok(PreparedStatement {
            conn,
            stmt,
            kind: StatementType::from_sql(sql),
            executions: 0,
        })
    }

    /// Executes the statement once with the given parameters
    pub fn execute<P: Params>(&mut self, params: P) -> Result<ExecResult> {
        let rows_affected = self.stmt.execute(params)?;
        self.executions += 1;
        let result = ExecResult::from_connection(self.conn, self.kind, rows_affected);
        debug!(
            rows_affected = result.rows_affected,
            last_insert_id = ?result.last_insert_id,
            execution = self.executions,
            "Executed prepared statement"
        );
        Ok(result)
    }

    /// Starts a lazy, single-pass walk over the statement's rows
    pub fn query<P: Params>(&mut self, params: P) -> Result<RowStream<'_>> {
        let rows = self.stmt.query(params)?;
        self.executions += 1;
        Ok(RowStream { rows, fetched: 0 })
    }

    /// Runs the statement and maps every row through `f`
    pub fn query_map<T, P, F>(&mut self, params: P, f: F) -> Result<Vec<T>>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        self.executions += 1;
        let rows = self
            .stmt
            .query_map(params, f)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Column names of the statement's result set
    pub fn column_names(&self) -> Vec<String> {
        self.stmt.column_names().into_iter().map(String::from).collect()
    }

    /// Number of positional parameters the statement expects
    pub fn parameter_count(&self) -> usize {
        self.stmt.parameter_count()
    }

    /// Number of times the statement has been run
    pub fn executions(&self) -> usize {
        self.executions
    }

    /// Releases the statement, reporting any error the driver raises
    ///
    /// Dropping the statement releases it too, but silently.
    pub fn close(self) -> Result<()> {
        let executions = self.executions;
        self.stmt.finalize().map_err(|e| {
            error!(error = %e, "Failed to finalize statement");
            e
        })?;
        debug!(executions, "Closed prepared statement");
        Ok(())
    }
}

/// Convenience function to prepare a statement on a connection
pub fn prepare<'conn>(conn: &'conn Connection, sql: &str) -> Result<PreparedStatement<'conn>> {
    PreparedStatement::prepare(conn, sql)
}

/// Single-pass cursor over the rows of one statement execution
///
/// Rows are fetched from the driver one at a time. Once `next` returns
/// `Ok(None)` the stream is exhausted; it cannot be rewound.
pub struct RowStream<'stmt> {
    rows: Rows<'stmt>,
    fetched: usize,
}

impl<'stmt> RowStream<'stmt> {
    /// Advances to the next row
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<Option<&Row<'stmt>>> {
        let row = self.rows.next()?;
        if row.is_some() {
            self.fetched += 1;
        }
        Ok(row)
    }

    /// Number of rows fetched so far
    pub fn fetched(&self) -> usize {
        self.fetched
    }

    /// Stops reading and releases the cursor before it is exhausted
    pub fn close(self) {
        debug!(fetched = self.fetched, "Released row stream");
    }
}
