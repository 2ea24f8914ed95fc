/// Connection Management Module
///
/// This module turns a `DatabaseConfig` into open `rusqlite::Connection`
/// handles. There is no pooling and no retry: every call opens a fresh
/// handle, and the handle is closed when the caller drops it or hands it
/// to `close`.

use crate::config::{DatabaseConfig, Location};
use crate::core::{DbPrimerError, Result};
use rusqlite::{Connection, OpenFlags};
use std::time::Duration;
use tracing::{debug, error, info};

/// Supplies configured connections to one database.
#[derive(Debug, Clone)]
pub struct ConnectionProvider {
    config: DatabaseConfig,
}

impl ConnectionProvider {
    /// Creates a provider for the given configuration
    pub fn new(config: DatabaseConfig) -> Self {
        ConnectionProvider { config }
    }

    /// Creates a provider whose every connection is a fresh in-memory database
    pub fn in_memory() -> Self {
        ConnectionProvider::new(DatabaseConfig::in_memory())
    }

    /// The configuration connections are built from
    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Opens a new connection and applies the configured pragmas
    ///
    /// # Returns
    ///
    /// An open connection owned by the caller.
    ///
    /// # Errors
    ///
    /// Returns `DbPrimerError::Connection` when the location cannot be opened
    /// in the requested mode (missing directory, missing file without
    /// `create`, read-only open of a missing file) or when a pragma is refused.
    ///
    /// # Examples
    ///
    /// ```
    /// use dbprimer::core::db::ConnectionProvider;
    ///
    /// let provider = ConnectionProvider::in_memory();
    /// let conn = provider.get_connection().unwrap();
    /// conn.execute_batch("CREATE TABLE t (x INTEGER)").unwrap();
    /// ```
    pub fn get_connection(&self) -> Result<Connection> {
        let location = self.config.location();
        let flags = self.open_flags();

        let conn = match &location {
            Location::Memory => Connection::open_in_memory_with_flags(flags),
            Location::File(path) => Connection::open_with_flags(path, flags),
        }
        .map_err(|e| {
            debug!(?location, error = %e, "Failed to open database");
            DbPrimerError::Connection(e)
        })?;

        self.configure(&conn).map_err(DbPrimerError::Connection)?;

        info!(?location, read_only = self.config.read_only, "Opened database connection");
        Ok(conn)
    }

    /// Runs `f` with a freshly opened connection and closes it afterwards
    ///
    /// The connection is closed on every exit path. An error from `f` wins
    /// over an error from closing; a close error is still logged.
    pub fn with_connection<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T>,
    {
        let mut conn = self.get_connection()?;
        let outcome = f(&mut conn);
        let closed = close(conn);

        match (outcome, closed) {
            (Err(e), _) => Err(e),
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(e)) => Err(e),
        }
    }

    fn open_flags(&self) -> OpenFlags {
        let mode = if self.config.read_only {
            OpenFlags::SQLITE_OPEN_READ_ONLY
        } else if self.config.create {
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE
        } else {
            OpenFlags::SQLITE_OPEN_READ_WRITE
        };
        mode | OpenFlags::SQLITE_OPEN_NO_MUTEX
    }

    fn configure(&self, conn: &Connection) -> rusqlite::Result<()> {
        conn.busy_timeout(Duration::from_millis(self.config.busy_timeout_ms))?;
        conn.pragma_update(None, "foreign_keys", self.config.foreign_keys)?;

        if let Some(mode) = &self.config.journal_mode {
            let applied: String =
                conn.pragma_update_and_check(None, "journal_mode", mode, |row| row.get(0))?;
            debug!(requested = %mode, applied = %applied, "Set journal mode");
        }

        Ok(())
    }
}

/// Closes a connection, surfacing the driver's close error
pub fn close(conn: Connection) -> Result<()> {
    conn.close().map_err(|(_, e)| {
        error!(error = %e, "Failed to close database connection");
        DbPrimerError::Connection(e)
    })
}
