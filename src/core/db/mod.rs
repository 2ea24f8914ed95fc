/// Database Module
///
/// The database layer is split into four concerns:
/// - **Connection Management** (`connection.rs`): opens and closes configured connections
/// - **Query Execution** (`query.rs`): one-shot `execute` / `query` calls with bound parameters
/// - **Prepared Statements** (`statement.rs`): reusable statements and lazy row streams
/// - **Transactions** (`transaction.rs`): begin / commit / rollback
///
/// All operations return the crate's `DbPrimerError`, with the driver error
/// kept as the source.
pub mod connection;
pub mod query;
pub mod statement;
pub mod transaction;

pub use connection::*;
pub use query::*;
pub use statement::*;
pub use transaction::*;
