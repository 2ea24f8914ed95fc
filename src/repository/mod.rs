//! Repositories: one struct per table, each method one fixed SQL string.
//!
//! Every repository borrows a `Connection`, so the same code runs on a plain
//! connection or inside a transaction via `Transaction::connection()`.

pub mod comment;
pub mod customer;
pub mod user;

pub use comment::{Comment, CommentRepository, SqliteCommentRepository};
pub use customer::{Customer, CustomerRepository, NewCustomer};
pub use user::UserRepository;
