use crate::core::{DbPrimerError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Schema name that selects an in-memory database instead of a file.
pub const MEMORY_SCHEMA: &str = ":memory:";

/// Top-level configuration structure parsed from a TOML file.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// Connection settings.
///
/// SQLite has no host, port or login, so the location is the data directory
/// plus the schema name, and the access mode plays the part of credentials.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub data_dir: PathBuf,
    pub schema: String,
    pub read_only: bool,
    pub create: bool,
    pub busy_timeout_ms: u64,
    pub foreign_keys: bool,
    pub journal_mode: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            data_dir: PathBuf::from("."),
            schema: "dbprimer".to_string(),
            read_only: false,
            create: true,
            busy_timeout_ms: 5_000,
            foreign_keys: true,
            journal_mode: None,
        }
    }
}

/// Where a configured database lives.
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    Memory,
    File(PathBuf),
}

impl DatabaseConfig {
    /// Config for a private in-memory database.
    pub fn in_memory() -> Self {
        DatabaseConfig {
            schema: MEMORY_SCHEMA.to_string(),
            ..Default::default()
        }
    }

    /// Config for `<data_dir>/<schema>.db`.
    pub fn file(data_dir: impl Into<PathBuf>, schema: impl Into<String>) -> Self {
        DatabaseConfig {
            data_dir: data_dir.into(),
            schema: schema.into(),
            ..Default::default()
        }
    }

    /// Resolves the schema name against the data directory.
    pub fn location(&self) -> Location {
        if self.schema == MEMORY_SCHEMA {
            Location::Memory
        } else {
            Location::File(self.data_dir.join(format!("{}.db", self.schema)))
        }
    }

    /// Rejects schema names that would not resolve inside `data_dir`.
    pub(crate) fn validate(&self) -> Result<()> {
        let schema = self.schema.as_str();
        if schema.trim().is_empty() {
            return Err(DbPrimerError::Config("schema name must not be empty".to_string()));
        }
        if schema.trim() != schema {
            return Err(DbPrimerError::Config(format!(
                "schema name '{}' must not start or end with whitespace",
                schema
            )));
        }
        if schema != MEMORY_SCHEMA && schema.contains(|c| c == '/' || c == '\\') {
            return Err(DbPrimerError::Config(format!(
                "schema name '{}' must not contain path separators, use data_dir instead",
                schema
            )));
        }
        Ok(())
    }
}

/// Loads configuration from a TOML file at the given path.
///
/// # Example
///
/// ```no_run
/// let config = dbprimer::config::load_config("config.toml").expect("Failed to load config");
/// println!("{:?}", config.database.location());
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from TOML text.
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).map_err(|e| DbPrimerError::Config(e.to_string()))?;
    config.database.validate()?;
    Ok(config)
}

/// The per-user config file, if the platform has a config directory.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("dbprimer").join("config.toml"))
}
