//! Read-only analytical queries over the storefront schema.
//!
//! # Responsibility
//! - Express the reporting joins, aggregations and subqueries as typed
//!   functions over a migrated connection.
//!
//! # Invariants
//! - Report functions never write.
//! - Every result ordering is deterministic (ties broken by id).

pub mod analytics;
