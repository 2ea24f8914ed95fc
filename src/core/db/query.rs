/// Query Execution Module
///
/// This module runs SQL against a borrowed connection: writes through
/// `execute`, reads through `query_map` (typed rows) or `query` (display
/// strings). Values always travel as bound parameters, never spliced into
/// the SQL text.

use crate::core::db::statement::PreparedStatement;
use crate::core::Result;
use rusqlite::{types::ValueRef, Connection, Params, Row};
use serde::Serialize;
use tracing::debug;

/// Outcome of a write statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExecResult {
    /// Rows inserted, updated or deleted
    pub rows_affected: usize,
    /// Row id assigned by this insert; `None` for other statements and for
    /// inserts that wrote no row
    pub last_insert_id: Option<i64>,
}

impl ExecResult {
    pub(crate) fn from_connection(conn: &Connection, kind: StatementType, rows_affected: usize) -> Self {
        let last_insert_id = match kind {
            // last_insert_rowid still holds the previous insert when nothing was written
            StatementType::Insert if rows_affected > 0 => Some(conn.last_insert_rowid()),
            _ => None,
        };
        ExecResult {
            rows_affected,
            last_insert_id,
        }
    }
}

/// Represents the result of a SQL query execution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    /// Column names from the query result
    pub columns: Vec<String>,
    /// Rows of data as string values
    pub rows: Vec<Vec<String>>,
    /// Number of rows returned
    pub row_count: usize,
}

impl QueryResult {
    /// Creates a new QueryResult from column names and row data
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let row_count = rows.len();
        QueryResult {
            columns,
            rows,
            row_count,
        }
    }

    /// Renders the result as a plain-text grid with a row count footer
    pub fn render_table(&self) -> String {
        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if let Some(width) = widths.get_mut(i) {
                    *width = (*width).max(cell.chars().count());
                }
            }
        }

        let render_line = |cells: &[String]| -> String {
            cells
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
                .collect::<Vec<_>>()
                .join(" | ")
                .trim_end()
                .to_string()
        };

        let mut out = String::new();
        out.push_str(&render_line(&self.columns));
        out.push('\n');
        out.push_str(
            &widths
                .iter()
                .map(|w| "-".repeat(*w))
                .collect::<Vec<_>>()
                .join("-+-"),
        );
        out.push('\n');
        for row in &self.rows {
            out.push_str(&render_line(row));
            out.push('\n');
        }
        let noun = if self.row_count == 1 { "row" } else { "rows" };
        out.push_str(&format!("({} {})", self.row_count, noun));
        out
    }
}

/// Query execution service that operates on a database connection
///
/// Works equally on a plain connection or on the connection behind a
/// `Transaction`, in which case every statement joins that transaction.
pub struct QueryExecutor<'a> {
    connection: &'a Connection,
}

impl<'a> QueryExecutor<'a> {
    /// Creates a new QueryExecutor for the given connection
    pub fn new(connection: &'a Connection) -> Self {
        QueryExecutor { connection }
    }

    /// Executes a single write statement with positional parameters
    ///
    /// # Errors
    ///
    /// Returns `DbPrimerError::Query` carrying the driver error on malformed
    /// SQL, a parameter count mismatch or a constraint violation.
    pub fn execute<P: Params>(&self, sql: &str, params: P) -> Result<ExecResult> {
        let kind = StatementType::from_sql(sql);
        debug!(sql, ?kind, "Executing statement");

        let rows_affected = self.connection.execute(sql, params)?;
        Ok(ExecResult::from_connection(self.connection, kind, rows_affected))
    }

    /// Runs a query and maps every row through `f`
    ///
    /// The row sequence is drained before returning, so the connection is
    /// free for the next statement.
    pub fn query_map<T, P, F>(&self, sql: &str, params: P, f: F) -> Result<Vec<T>>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        debug!(sql, "Running query");
        let mut stmt = self.connection.prepare(sql)?;
        let rows = stmt
            .query_map(params, f)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Executes a SQL query and returns formatted results
    ///
    /// # Returns
    ///
    /// Returns a `QueryResult` with column names, row data, and row count.
    /// Values are formatted for display.
    pub fn query<P: Params>(&self, sql: &str, params: P) -> Result<QueryResult> {
        debug!(sql, "Running query");
        let mut stmt = self.connection.prepare(sql)?;

        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let column_count = stmt.column_count();

        let rows = stmt
            .query_map(params, |row| {
                let mut values = Vec::with_capacity(column_count);
                for i in 0..column_count {
                    values.push(format_value(row.get_ref(i)?));
                }
                Ok(values)
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(QueryResult::new(columns, rows))
    }

    /// Prepares a SQL statement for repeated execution
    pub fn prepare(&self, sql: &str) -> Result<PreparedStatement<'a>> {
        PreparedStatement::prepare(self.connection, sql)
    }
}

/// Convenience function to execute a write statement on a connection
pub fn execute<P: Params>(conn: &Connection, sql: &str, params: P) -> Result<ExecResult> {
    QueryExecutor::new(conn).execute(sql, params)
}

/// Convenience function to run a mapped query on a connection
pub fn query_map<T, P, F>(conn: &Connection, sql: &str, params: P, f: F) -> Result<Vec<T>>
where
    P: Params,
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    QueryExecutor::new(conn).query_map(sql, params, f)
}

/// Convenience function to run a query on a connection and format the rows
pub fn query<P: Params>(conn: &Connection, sql: &str, params: P) -> Result<QueryResult> {
    QueryExecutor::new(conn).query(sql, params)
}

/// Formats a SQLite value for display
fn format_value(value: ValueRef) -> String {
    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).to_string(),
        ValueRef::Blob(b) => format!("<BLOB: {} bytes>", b.len()),
    }
}

/// Represents different SQL statement types for introspection
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatementType {
    Select,
    Insert,
    Update,
    Delete,
    /// CREATE / DROP / ALTER
    Ddl,
    /// BEGIN/COMMIT/ROLLBACK transaction commands
    Transaction,
    Other,
}

impl StatementType {
    /// Determines the statement type from the leading keyword of a SQL string
    pub fn from_sql(sql: &str) -> Self {
        let keyword = sql
            .trim_start()
            .split(|c: char| c.is_whitespace() || c == '(' || c == ';')
            .next()
            .unwrap_or("")
            .to_uppercase();

        match keyword.as_str() {
            "SELECT" | "WITH" | "VALUES" => StatementType::Select,
            "INSERT" | "REPLACE" => StatementType::Insert,
            "UPDATE" => StatementType::Update,
            "DELETE" => StatementType::Delete,
            "CREATE" | "DROP" | "ALTER" => StatementType::Ddl,
            "BEGIN" | "COMMIT" | "END" | "ROLLBACK" | "SAVEPOINT" | "RELEASE" => {
                StatementType::Transaction
            }
            _ => StatementType::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DbPrimerError;
    use rusqlite::{params, Connection};

    fn setup_test_table(conn: &Connection) {
        conn.execute_batch(
            "
            CREATE TABLE test (
                id INTEGER PRIMARY KEY,
                name TEXT,
                value REAL,
                active BOOLEAN DEFAULT 1
            );
            INSERT INTO test (name, value) VALUES ('Alice', 123.45);
            INSERT INTO test (name, value) VALUES ('Bob', 678.90);
            INSERT INTO test (name, value) VALUES (NULL, NULL);
        ",
        )
        .unwrap();
    }

    #[test]
    fn test_query_execution() {
        let conn = Connection::open_in_memory().unwrap();
        setup_test_table(&conn);

        let result = query(&conn, "SELECT * FROM test ORDER BY id", []).unwrap();

        assert_eq!(result.columns, vec!["id", "name", "value", "active"]);
        assert_eq!(result.row_count, 3);
        assert_eq!(result.rows[0], vec!["1", "Alice", "123.45", "1"]);
        // NULL handling
        assert_eq!(result.rows[2], vec!["3", "NULL", "NULL", "1"]);
    }

    #[test]
    fn test_query_with_params() {
        let conn = Connection::open_in_memory().unwrap();
        setup_test_table(&conn);

        let names = query_map(
            &conn,
            "SELECT name FROM test WHERE value > ?1 ORDER BY id",
            [200.0],
            |row| row.get::<_, String>(0),
        )
        .unwrap();
        assert_eq!(names, vec!["Bob"]);
    }

    #[test]
    fn test_execute_insert_reports_id() {
        let conn = Connection::open_in_memory().unwrap();
        setup_test_table(&conn);

        let executor = QueryExecutor::new(&conn);
        let result = executor
            .execute("INSERT INTO test (name, value) VALUES (?1, ?2)", params!["Carol", 1.5])
            .unwrap();
        assert_eq!(result.rows_affected, 1);
        assert_eq!(result.last_insert_id, Some(4));
    }

    #[test]
    fn test_insert_that_writes_nothing_has_no_insert_id() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE u (id INTEGER PRIMARY KEY, name TEXT UNIQUE)")
            .unwrap();

        let first = execute(&conn, "INSERT OR IGNORE INTO u (name) VALUES ('a')", []).unwrap();
        assert_eq!(first.last_insert_id, Some(1));

        let ignored = execute(&conn, "INSERT OR IGNORE INTO u (name) VALUES ('a')", []).unwrap();
        assert_eq!(ignored.rows_affected, 0);
        assert_eq!(ignored.last_insert_id, None);

        let empty_select = execute(&conn, "INSERT INTO u (name) SELECT name FROM u WHERE 0", []).unwrap();
        assert_eq!(empty_select.rows_affected, 0);
        assert_eq!(empty_select.last_insert_id, None);
    }

    #[test]
    fn test_execute_update_has_no_insert_id() {
        let conn = Connection::open_in_memory().unwrap();
        setup_test_table(&conn);

        let result = execute(&conn, "UPDATE test SET active = 0 WHERE name IS NOT NULL", []).unwrap();
        assert_eq!(result.rows_affected, 2);
        assert_eq!(result.last_insert_id, None);
    }

    #[test]
    fn test_query_error_handling() {
        let conn = Connection::open_in_memory().unwrap();

        let result = query(&conn, "SELECT * FROM nonexistent_table", []);
        match result.unwrap_err() {
            DbPrimerError::Query(e) => assert!(e.to_string().contains("no such table")),
            other => panic!("Expected Query error, got {:?}", other),
        }
    }

    #[test]
    fn test_constraint_violation_is_query_error() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE user (username TEXT PRIMARY KEY, password TEXT NOT NULL)")
            .unwrap();

        execute(&conn, "INSERT INTO user (username, password) VALUES (?1, ?2)", ["eko", "Eko"]).unwrap();
        let err = execute(&conn, "INSERT INTO user (username, password) VALUES (?1, ?2)", ["eko", "x"])
            .unwrap_err();
        match err {
            DbPrimerError::Query(e) => assert!(e.to_string().contains("UNIQUE")),
            other => panic!("Expected Query error, got {:?}", other),
        }
    }

    #[test]
    fn test_hostile_parameter_is_stored_verbatim() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE user (username TEXT PRIMARY KEY, password TEXT NOT NULL)")
            .unwrap();

        let payload = "eko'; DROP TABLE user; --";
        execute(&conn, "INSERT INTO user (username, password) VALUES (?1, ?2)", [payload, "Eko"]).unwrap();

        let stored = query_map(&conn, "SELECT username FROM user", [], |row| row.get::<_, String>(0)).unwrap();
        assert_eq!(stored, vec![payload.to_string()]);
    }

    #[test]
    fn test_blob_handling() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute("CREATE TABLE blobs (id INTEGER, data BLOB)", []).unwrap();
        conn.execute("INSERT INTO blobs VALUES (1, X'48656C6C6F')", []).unwrap(); // "Hello" in hex

        let result = query(&conn, "SELECT data FROM blobs WHERE id = 1", []).unwrap();
        assert_eq!(result.rows[0][0], "<BLOB: 5 bytes>");
    }

    #[test]
    fn test_render_table() {
        let result = QueryResult::new(
            vec!["id".to_string(), "email".to_string()],
            vec![
                vec!["1".to_string(), "a@test.com".to_string()],
                vec!["10".to_string(), "NULL".to_string()],
            ],
        );

        insta::assert_snapshot!(result.render_table(), @r###"
        id | email
        ---+-----------
        1  | a@test.com
        10 | NULL
        (2 rows)
        "###);
    }

    #[test]
    fn test_statement_type_classification() {
        assert_eq!(StatementType::from_sql("SELECT * FROM users"), StatementType::Select);
        assert_eq!(StatementType::from_sql("  insert INTO users VALUES (1)"), StatementType::Insert);
        assert_eq!(StatementType::from_sql("UPDATE users SET name = 'new'"), StatementType::Update);
        assert_eq!(StatementType::from_sql("DELETE FROM users WHERE id = 1"), StatementType::Delete);
        assert_eq!(StatementType::from_sql("CREATE TABLE test (id INTEGER)"), StatementType::Ddl);
        assert_eq!(StatementType::from_sql("DROP TABLE test"), StatementType::Ddl);
        assert_eq!(StatementType::from_sql("BEGIN"), StatementType::Transaction);
        assert_eq!(StatementType::from_sql("ROLLBACK;"), StatementType::Transaction);
        assert_eq!(StatementType::from_sql("WITH x AS (SELECT 1) SELECT * FROM x"), StatementType::Select);
        assert_eq!(StatementType::from_sql("PRAGMA foreign_keys = ON"), StatementType::Other);
        assert_eq!(StatementType::from_sql(""), StatementType::Other);
    }
}
