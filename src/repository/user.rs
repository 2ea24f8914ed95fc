//! User repository: parameterized login next to a concatenated one.
//!
//! `login_unsafe` splices its inputs into the SQL text. It stays here to show
//! what bound parameters prevent; nothing else in the crate calls it.
use crate::core::db::{execute, prepare, PreparedStatement};
use crate::core::Result;
use rusqlite::{params, Connection};
use tracing::{debug, warn};

const INSERT_SQL: &str = "INSERT INTO user (username, password) VALUES (?1, ?2)";
const LOGIN_SQL: &str = "SELECT username FROM user WHERE username = ?1 AND password = ?2 LIMIT 1";

pub struct UserRepository<'c> {
    conn: &'c Connection,
}

impl<'c> UserRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn insert(&self, username: &str, password: &str) -> Result<()> {
        execute(self.conn, INSERT_SQL, params![username, password])?;
        debug!("Inserted user {}", username);
        Ok(())
    }

    /// Returns the matching username, or `None` when the pair is unknown.
    pub fn login(&self, username: &str, password: &str) -> Result<Option<String>> {
        let mut stmt = prepare(self.conn, LOGIN_SQL)?;
        first_username(&mut stmt, params![username, password])
    }

    /// Same lookup as `login`, but with the inputs concatenated into the SQL.
    /// A quote in `username` ends the string literal early, so input such as
    /// `admin' --` comments out the password check.
    pub fn login_unsafe(&self, username: &str, password: &str) -> Result<Option<String>> {
        let sql = format!(
            "SELECT username FROM user WHERE username = '{}' AND password = '{}' LIMIT 1",
            username, password
        );
        warn!(sql = %sql, "Running concatenated login query");
        let mut stmt = prepare(self.conn, &sql)?;
        first_username(&mut stmt, [])
    }
}

fn first_username<P: rusqlite::Params>(stmt: &mut PreparedStatement<'_>, params: P) -> Result<Option<String>> {
    let mut rows = stmt.query(params)?;
    let username = match rows.next()? {
        Some(row) => Some(row.get::<_, String>(0)?),
        None => None,
    };
    rows.close();
    Ok(username)
}
