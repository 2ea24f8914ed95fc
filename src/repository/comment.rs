//! Comment repository: fixed SQL over the `comments` table.
use crate::core::db::{execute, query_map};
use crate::core::{DbPrimerError, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;
use tracing::debug;

const INSERT_SQL: &str = "INSERT INTO comments (email, comment) VALUES (?1, ?2)";
const FIND_BY_ID_SQL: &str = "SELECT id, email, comment FROM comments WHERE id = ?1 LIMIT 1";
const FIND_ALL_SQL: &str = "SELECT id, email, comment FROM comments ORDER BY id";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comment {
    pub id: i64,
    pub email: String,
    pub comment: String,
}

impl Comment {
    pub fn new(email: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            id: 0, // Will be set by database
            email: email.into(),
            comment: comment.into(),
        }
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Comment {
            id: row.get(0)?,
            email: row.get(1)?,
            // comment is nullable in the table; an absent body reads as empty
            comment: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        })
    }
}

pub trait CommentRepository {
    /// Stores the comment and returns the id the database assigned.
    /// `comment.id` is ignored.
    fn insert(&self, comment: &Comment) -> Result<i64>;

    /// Returns `DbPrimerError::NotFound` when no comment has this id.
    fn find_by_id(&self, id: i64) -> Result<Comment>;

    /// Every comment, oldest first.
    fn find_all(&self) -> Result<Vec<Comment>>;
}

/// `CommentRepository` over a borrowed connection.
///
/// Pass `Transaction::connection()` to run the calls inside a transaction.
pub struct SqliteCommentRepository<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteCommentRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

impl CommentRepository for SqliteCommentRepository<'_> {
    fn insert(&self, comment: &Comment) -> Result<i64> {
        let result = execute(self.conn, INSERT_SQL, params![comment.email, comment.comment])?;
        let id = result.last_insert_id.unwrap_or_else(|| self.conn.last_insert_rowid());
        debug!("Inserted comment with id {}", id);
        Ok(id)
    }

    fn find_by_id(&self, id: i64) -> Result<Comment> {
        self.conn
            .query_row(FIND_BY_ID_SQL, [id], Comment::from_row)
            .optional()?
            .ok_or_else(|| DbPrimerError::not_found("Comment", id))
    }

    fn find_all(&self) -> Result<Vec<Comment>> {
        query_map(self.conn, FIND_ALL_SQL, [], Comment::from_row)
    }
}
