//! Batch writes: a prepared-statement loop, and the same loop wrapped in a
//! transaction that ends in commit or rollback.
use crate::core::db::{begin, prepare, PreparedStatement};
use crate::core::Result;
use rusqlite::{params, Connection};
use tracing::info;

const INSERT_COMMENT_SQL: &str = "INSERT INTO comments (email, comment) VALUES (?1, ?2)";

/// How a transactional batch ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Commit,
    Rollback,
}

/// Inserts `count` generated comments through one prepared statement and
/// returns the ids in insertion order.
pub fn seed_comments(conn: &Connection, count: usize) -> Result<Vec<i64>> {
    let mut stmt = prepare(conn, INSERT_COMMENT_SQL)?;
    let ids = insert_generated(&mut stmt, count)?;
    stmt.close()?;
    info!(count = ids.len(), "Seeded comments");
    Ok(ids)
}

/// Runs the `seed_comments` batch inside a transaction.
///
/// Returns the ids observed inside the transaction. After a rollback those
/// ids no longer exist. A failing insert aborts the batch with the
/// transaction dropped, which rolls it back.
pub fn seed_comments_in_transaction(conn: &mut Connection, count: usize, outcome: Outcome) -> Result<Vec<i64>> {
    let tx = begin(conn)?;

    let ids = {
        let mut stmt = tx.prepare(INSERT_COMMENT_SQL)?;
        let ids = insert_generated(&mut stmt, count)?;
        stmt.close()?;
        ids
    };

    match outcome {
        Outcome::Commit => tx.commit()?,
        Outcome::Rollback => tx.rollback()?,
    }
    info!(count = ids.len(), ?outcome, "Finished transactional batch");
    Ok(ids)
}

fn insert_generated(stmt: &mut PreparedStatement<'_>, count: usize) -> Result<Vec<i64>> {
    let mut ids = Vec::with_capacity(count);
    for i in 0..count {
        let email = format!("Siroj{}email.com", i);
        let comment = format!("Komentar ke{}", i);
        let result = stmt.execute(params![email, comment])?;
        if let Some(id) = result.last_insert_id {
            ids.push(id);
        }
    }
    Ok(ids)
}
