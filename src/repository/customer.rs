//! Customer repository: typed reads of the wide `customer` table,
//! including nullable and date columns.
use crate::core::db::{execute, query_map};
use crate::core::Result;
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, Row};
use serde::Serialize;
use tracing::debug;

const INSERT_SQL: &str = "INSERT INTO customer (id, name, email, balance, rating, birth_date, marriage)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)";
const FIND_ALL_SQL: &str = "SELECT id, name, email, balance, rating, birth_date, marriage, created_at
     FROM customer
     ORDER BY created_at, id";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub balance: i32,
    pub rating: f64,
    pub birth_date: Option<NaiveDate>,
    pub marriage: bool,
    pub created_at: NaiveDateTime,
}

impl Customer {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Customer {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            balance: row.get(3)?,
            rating: row.get(4)?,
            birth_date: row.get(5)?,
            marriage: row.get(6)?,
            created_at: row.get(7)?,
        })
    }
}

/// Fields supplied on insert; `created_at` is set by the database.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCustomer {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub balance: i32,
    pub rating: f64,
    pub birth_date: Option<NaiveDate>,
    pub marriage: bool,
}

impl NewCustomer {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        NewCustomer {
            id: id.into(),
            name: name.into(),
            email: None,
            balance: 0,
            rating: 0.0,
            birth_date: None,
            marriage: false,
        }
    }
}

pub struct CustomerRepository<'c> {
    conn: &'c Connection,
}

impl<'c> CustomerRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn insert(&self, customer: &NewCustomer) -> Result<()> {
        execute(
            self.conn,
            INSERT_SQL,
            params![
                customer.id,
                customer.name,
                customer.email,
                customer.balance,
                customer.rating,
                customer.birth_date,
                customer.marriage,
            ],
        )?;
        debug!("Inserted customer {}", customer.id);
        Ok(())
    }

    /// Inserts with a literal statement and no parameters. Every other
    /// column takes its default.
    pub fn insert_raw(&self, id: &str, name: &str) -> Result<()> {
        let sql = format!(
            "INSERT INTO customer (id, name) VALUES ('{}', '{}')",
            id.replace('\'', "''"),
            name.replace('\'', "''")
        );
        execute(self.conn, &sql, [])?;
        Ok(())
    }

    pub fn find_all(&self) -> Result<Vec<Customer>> {
        query_map(self.conn, FIND_ALL_SQL, [], Customer::from_row)
    }
}
