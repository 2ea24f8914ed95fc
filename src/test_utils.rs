/// # Test Utilities Module
///
/// Shared fixtures for unit and integration tests:
/// - Isolated in-memory databases with the demo tables
/// - Sample data for read paths
/// - DbPrimerError assertion helpers

use crate::core::db::ConnectionProvider;
use crate::core::Result;
use crate::fixtures::create_demo_tables;
use crate::repository::{Comment, CommentRepository, CustomerRepository, NewCustomer, SqliteCommentRepository, UserRepository};
use chrono::NaiveDate;
use rusqlite::Connection;

/// Isolated database test fixture
///
/// Each fixture owns a private in-memory database, so tests never see each
/// other's rows.
pub struct DatabaseFixture {
    pub name: String,
    pub connection: Connection,
}

impl DatabaseFixture {
    /// Create a new test database with the demo tables
    pub fn new(name: &str) -> Result<Self> {
        let connection = ConnectionProvider::in_memory().get_connection()?;
        create_demo_tables(&connection)?;

        Ok(DatabaseFixture {
            name: name.to_string(),
            connection,
        })
    }

    /// Create fixture with sample rows in every table
    pub fn with_sample_data(name: &str) -> Result<Self> {
        let fixture = Self::new(name)?;
        fixture.populate_sample_data()?;
        Ok(fixture)
    }

    fn populate_sample_data(&self) -> Result<()> {
        let customers = CustomerRepository::new(&self.connection);
        customers.insert(&NewCustomer {
            email: Some("eko@example.com".to_string()),
            balance: 1_000_000,
            rating: 90.0,
            birth_date: NaiveDate::from_ymd_opt(1999, 9, 9),
            marriage: true,
            ..NewCustomer::new("eko", "Eko")
        })?;
        customers.insert(&NewCustomer::new("budi", "Budi"))?;

        let users = UserRepository::new(&self.connection);
        users.insert("admin", "admin")?;

        let comments = SqliteCommentRepository::new(&self.connection);
        comments.insert(&Comment::new("a@test.com", "hi"))?;
        comments.insert(&Comment::new("b@test.com", "yo"))?;

        Ok(())
    }

    /// Number of rows in `table`
    pub fn count(&self, table: &str) -> i64 {
        self.connection
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))
            .expect("Failed to count rows")
    }
}

/// Error testing utilities
pub mod error_testing {
    /// Verify error message quality (contains helpful information)
    pub fn verify_error_message_quality<T, E>(result: &std::result::Result<T, E>, context: &str)
    where
        T: std::fmt::Debug,
        E: std::fmt::Display,
    {
        match result {
            Ok(value) => panic!("Expected error but got Ok({:?}) in {}", value, context),
            Err(error) => {
                let error_str = error.to_string();
                assert!(!error_str.is_empty(), "Error message should not be empty in {}", context);

                let lower = error_str.to_lowercase();
                let has_operation_context =
                    lower.contains("error") || lower.contains("not found") || lower.contains("failed");
                assert!(
                    has_operation_context,
                    "Error should indicate what operation failed: '{}' in {}",
                    error_str, context
                );
            }
        }
    }
}

/// Asserts that a result is a specific `DbPrimerError` tuple variant
#[macro_export]
macro_rules! assert_dbprimer_error {
    ($result:expr, $expected_type:ident, $context:expr) => {
        match $result {
            Err($crate::core::DbPrimerError::$expected_type(_)) => {}
            Ok(_) => panic!("Expected {} error but got Ok in {}", stringify!($expected_type), $context),
            Err(other) => panic!("Expected {} but got {:?} in {}", stringify!($expected_type), other, $context),
        }
    };
}

/// Asserts that a result is `DbPrimerError::NotFound`
#[macro_export]
macro_rules! assert_not_found {
    ($result:expr, $context:expr) => {
        match $result {
            Err($crate::core::DbPrimerError::NotFound { .. }) => {}
            Ok(value) => panic!("Expected NotFound but got Ok({:?}) in {}", value, $context),
            Err(other) => panic!("Expected NotFound but got {:?} in {}", other, $context),
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DbPrimerError;

    #[test]
    fn test_database_fixture_creation() {
        let fixture = DatabaseFixture::new("test_create").unwrap();
        assert_eq!(fixture.name, "test_create");
        assert_eq!(fixture.count("comments"), 0);
    }

    #[test]
    fn test_sample_data_fixture() {
        let fixture = DatabaseFixture::with_sample_data("test_sample").unwrap();
        assert_eq!(fixture.count("customer"), 2);
        assert_eq!(fixture.count("user"), 1);
        assert_eq!(fixture.count("comments"), 2);
    }

    #[test]
    fn test_fixtures_are_isolated() {
        let first = DatabaseFixture::with_sample_data("first").unwrap();
        let second = DatabaseFixture::new("second").unwrap();
        assert_eq!(first.count("comments"), 2);
        assert_eq!(second.count("comments"), 0);
    }

    #[test]
    fn test_error_assertion_macros() {
        let result: Result<i32> = Err(DbPrimerError::Config("Test error".to_string()));
        assert_dbprimer_error!(result, Config, "macro test");

        let missing: Result<i32> = Err(DbPrimerError::not_found("Comment", 9));
        assert_not_found!(missing, "macro test");
    }

    #[test]
    fn test_error_message_quality() {
        let result: Result<i32> = Err(DbPrimerError::not_found("Comment", 9));
        error_testing::verify_error_message_quality(&result, "not found message");
    }
}
