//! Tables the walkthrough reads and writes.
//!
//! This is a single idempotent batch, not a migration system: running it
//! again against an existing database is a no-op.
use crate::core::Result;
use rusqlite::Connection;
use tracing::debug;

pub const DEMO_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS customer (
    id VARCHAR(100) PRIMARY KEY NOT NULL,
    name VARCHAR(100) NOT NULL,
    email VARCHAR(100),
    balance INTEGER NOT NULL DEFAULT 0,
    rating REAL NOT NULL DEFAULT 0.0,
    birth_date DATE,
    marriage BOOLEAN NOT NULL DEFAULT 0,
    created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS user (
    username VARCHAR(100) PRIMARY KEY NOT NULL,
    password VARCHAR(100) NOT NULL
);

CREATE TABLE IF NOT EXISTS comments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email VARCHAR(100) NOT NULL,
    comment TEXT
);
"#;

/// Creates the `customer`, `user` and `comments` tables if missing.
pub fn create_demo_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(DEMO_SCHEMA)?;
    debug!("Demo tables ready");
    Ok(())
}
