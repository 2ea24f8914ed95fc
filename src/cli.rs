//! CLI argument definitions and command dispatch.
//!
//! Each command opens one connection, runs, and closes it again. Commands
//! return their output as a string so `main` decides where it goes.

use clap::{Parser, Subcommand};
use rusqlite::{params_from_iter, Connection};
use std::path::PathBuf;

use crate::config::{default_config_path, load_config, Config, DatabaseConfig};
use crate::core::db::{execute, query, ConnectionProvider};
use crate::core::Result;
use crate::demo::{seed_comments, seed_comments_in_transaction, Outcome};
use crate::fixtures::create_demo_tables;
use crate::repository::{Comment, CommentRepository, Customer, CustomerRepository, SqliteCommentRepository, UserRepository};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to a TOML config file with a [database] table
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Database name; the file is <data-dir>/<schema>.db, or `:memory:`
    #[arg(long, global = true)]
    pub schema: Option<String>,

    /// Directory holding the database file
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the customer, user and comments tables
    Init,
    /// Execute a write statement with positional parameters (use `--` before values starting with '-')
    Exec {
        /// SQL with ?1, ?2 ... placeholders
        sql: String,
        /// Values bound to the placeholders, in order
        params: Vec<String>,
    },
    /// Run a query with positional parameters and print the rows
    Query {
        /// SQL with ?1, ?2 ... placeholders
        sql: String,
        /// Values bound to the placeholders, in order
        params: Vec<String>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Work with the comments table
    #[command(subcommand)]
    Comment(CommentCommand),
    /// Work with the customer table
    #[command(subcommand)]
    Customer(CustomerCommand),
    /// Work with the user table
    #[command(subcommand)]
    User(UserCommand),
    /// Check a username and password
    Login {
        username: String,
        password: String,
        /// Build the query by string concatenation (injectable)
        #[arg(long = "unsafe")]
        unsafe_sql: bool,
    },
    /// Insert generated comments through one prepared statement
    Seed {
        /// Number of comments to insert
        count: usize,
    },
    /// Insert generated comments inside a transaction
    Tx {
        /// Number of comments to insert
        count: usize,
        /// Commit instead of rolling back
        #[arg(long)]
        commit: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum CommentCommand {
    /// Insert a comment and print its id
    Add { email: String, body: String },
    /// Show one comment
    Get {
        id: i64,
        #[arg(long)]
        json: bool,
    },
    /// List every comment, oldest first
    List {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum CustomerCommand {
    /// List every customer
    List {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// Insert a user
    Add { username: String, password: String },
}

impl Args {
    /// Config file (explicit, then per-user, then defaults) with flag overrides applied
    pub fn database_config(&self) -> Result<DatabaseConfig> {
        self.resolve_config(default_config_path())
    }

    fn resolve_config(&self, per_user: Option<PathBuf>) -> Result<DatabaseConfig> {
        let config = match &self.config {
            Some(path) => load_config(path)?,
            None => match per_user.filter(|path| path.exists()) {
                Some(path) => load_config(path)?,
                None => Config::default(),
            },
        };

        let mut database = config.database;
        if let Some(schema) = &self.schema {
            database.schema = schema.clone();
        }
        if let Some(data_dir) = &self.data_dir {
            database.data_dir = data_dir.clone();
        }
        database.validate()?;
        Ok(database)
    }
}

/// Runs the parsed command against a fresh connection
pub fn run(args: &Args) -> Result<String> {
    let provider = ConnectionProvider::new(args.database_config()?);
    provider.with_connection(|conn| args.command.run(conn))
}

impl Command {
    fn run(&self, conn: &mut Connection) -> Result<String> {
        match self {
            Command::Init => {
                create_demo_tables(conn)?;
                Ok("Created tables: customer, user, comments".to_string())
            }
            Command::Exec { sql, params } => {
                let result = execute(conn, sql, params_from_iter(params.iter()))?;
                let mut out = format!("Rows affected: {}", result.rows_affected);
                if let Some(id) = result.last_insert_id {
                    out.push_str(&format!("\nLast insert id: {}", id));
                }
                Ok(out)
            }
            Command::Query { sql, params, json } => {
                let result = query(conn, sql, params_from_iter(params.iter()))?;
                if *json {
                    Ok(serde_json::to_string_pretty(&result)?)
                } else {
                    Ok(result.render_table())
                }
            }
            Command::Comment(cmd) => cmd.run(conn),
            Command::Customer(cmd) => cmd.run(conn),
            Command::User(UserCommand::Add { username, password }) => {
                UserRepository::new(conn).insert(username, password)?;
                Ok(format!("Inserted user {}", username))
            }
            Command::Login {
                username,
                password,
                unsafe_sql,
            } => {
                let users = UserRepository::new(conn);
                let found = if *unsafe_sql {
                    users.login_unsafe(username, password)?
                } else {
                    users.login(username, password)?
                };
                Ok(match found {
                    Some(name) => format!("Login succeeded: {}", name),
                    None => "Login failed".to_string(),
                })
            }
            Command::Seed { count } => {
                let ids = seed_comments(conn, *count)?;
                Ok(format!("Inserted comment ids: {}", join_ids(&ids)))
            }
            Command::Tx { count, commit } => {
                let outcome = if *commit { Outcome::Commit } else { Outcome::Rollback };
                let ids = seed_comments_in_transaction(conn, *count, outcome)?;
                let verb = match outcome {
                    Outcome::Commit => "committed",
                    Outcome::Rollback => "rolled back",
                };
                Ok(format!("Transaction {}; ids seen inside it: {}", verb, join_ids(&ids)))
            }
        }
    }
}

impl CommentCommand {
    fn run(&self, conn: &Connection) -> Result<String> {
        let comments = SqliteCommentRepository::new(conn);
        match self {
            CommentCommand::Add { email, body } => {
                let id = comments.insert(&Comment::new(email.as_str(), body.as_str()))?;
                Ok(format!("Inserted comment {}", id))
            }
            CommentCommand::Get { id, json } => {
                let comment = comments.find_by_id(*id)?;
                if *json {
                    Ok(serde_json::to_string_pretty(&comment)?)
                } else {
                    Ok(format_comment(&comment))
                }
            }
            CommentCommand::List { json } => {
                let all = comments.find_all()?;
                if *json {
                    Ok(serde_json::to_string_pretty(&all)?)
                } else {
                    Ok(all.iter().map(format_comment).collect::<Vec<_>>().join("\n"))
                }
            }
        }
    }
}

impl CustomerCommand {
    fn run(&self, conn: &Connection) -> Result<String> {
        match self {
            CustomerCommand::List { json } => {
                let all = CustomerRepository::new(conn).find_all()?;
                if *json {
                    Ok(serde_json::to_string_pretty(&all)?)
                } else {
                    Ok(all.iter().map(format_customer).collect::<Vec<_>>().join("\n"))
                }
            }
        }
    }
}

fn format_comment(comment: &Comment) -> String {
    format!("{}\t{}\t{}", comment.id, comment.email, comment.comment)
}

fn format_customer(customer: &Customer) -> String {
    let or_dash = |value: Option<String>| value.unwrap_or_else(|| "-".to_string());
    format!(
        "{}\t{}\temail={}\tbalance={}\trating={}\tbirth_date={}\tmarried={}\tcreated_at={}",
        customer.id,
        customer.name,
        or_dash(customer.email.clone()),
        customer.balance,
        customer.rating,
        or_dash(customer.birth_date.map(|d| d.to_string())),
        customer.marriage,
        customer.created_at
    )
}

fn join_ids(ids: &[i64]) -> String {
    if ids.is_empty() {
        return "none".to_string();
    }
    ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(", ")
}
