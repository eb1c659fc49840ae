//! Customer repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Email uniqueness and format are enforced by SQLite; validation runs first
//!   so malformed input never reaches the engine.
//! - The `email` column is `COLLATE NOCASE`: uniqueness and lookups ignore
//!   ASCII case.
//! - Email lookups use the normalized (trimmed, lowercase) form.

use crate::model::customer::{normalize_email, Customer, CustomerId};
use crate::repo::{ensure_connection_ready, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const CUSTOMER_SELECT_SQL: &str = "SELECT
    customer_id,
    first_name,
    last_name,
    email,
    password
FROM customer";

/// Repository interface for customer operations.
pub trait CustomerRepository {
    fn create_customer(&self, customer: &Customer) -> RepoResult<CustomerId>;
    fn get_customer(&self, id: CustomerId) -> RepoResult<Option<Customer>>;
    fn find_by_email(&self, email: &str) -> RepoResult<Option<Customer>>;
    fn list_customers(&self) -> RepoResult<Vec<Customer>>;
}

/// SQLite-backed customer repository.
pub struct SqliteCustomerRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCustomerRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["customer"])?;
        Ok(Self { conn })
    }
}

impl CustomerRepository for SqliteCustomerRepository<'_> {
    fn create_customer(&self, customer: &Customer) -> RepoResult<CustomerId> {
        customer.validate()?;

        self.conn.execute(
            "INSERT INTO customer (
                customer_id,
                first_name,
                last_name,
                email,
                password
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                customer.customer_id.to_string(),
                customer.first_name.as_str(),
                customer.last_name.as_str(),
                customer.email.as_str(),
                customer.password.as_str(),
            ],
        )?;

        Ok(customer.customer_id)
    }

    fn get_customer(&self, id: CustomerId) -> RepoResult<Option<Customer>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CUSTOMER_SELECT_SQL} WHERE customer_id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_customer_row(row)?));
        }
        Ok(None)
    }

    fn find_by_email(&self, email: &str) -> RepoResult<Option<Customer>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CUSTOMER_SELECT_SQL} WHERE email = ?1;"
        ))?;
        let mut rows = stmt.query([normalize_email(email)])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_customer_row(row)?));
        }
        Ok(None)
    }

    fn list_customers(&self) -> RepoResult<Vec<Customer>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CUSTOMER_SELECT_SQL} ORDER BY last_name ASC, first_name ASC, customer_id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut customers = Vec::new();
        while let Some(row) = rows.next()? {
            customers.push(parse_customer_row(row)?);
        }
        Ok(customers)
    }
}

fn parse_customer_row(row: &Row<'_>) -> RepoResult<Customer> {
    let id_text: String = row.get("customer_id")?;
    let customer = Customer {
        customer_id: parse_uuid(&id_text, "customer.customer_id")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        email: row.get("email")?,
        password: row.get("password")?,
    };
    customer.validate().map_err(|err| {
        RepoError::InvalidData(format!("customer {id_text} violates schema checks: {err}"))
    })?;
    Ok(customer)
}
