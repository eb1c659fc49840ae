//! Core schema and data access for the storefront database.
//! This crate owns the relational schema and every invariant it enforces.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod report;
pub mod repo;
pub mod service;

pub use config::{ConfigError, StoreConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::catalog::{Category, CategoryId, NewProduct, Product, ProductId};
pub use model::customer::{Customer, CustomerId, EMAIL_PATTERN};
pub use model::order::{Order, OrderDetail, OrderDetailId, OrderHistoryEntry, OrderId};
pub use model::{ModelValidationError, Money};
pub use repo::catalog_repo::{CatalogRepository, ProductListQuery, SqliteCatalogRepository};
pub use repo::customer_repo::{CustomerRepository, SqliteCustomerRepository};
pub use repo::order_repo::{OrderLine, OrderRepository, PlacedOrder, SqliteOrderRepository};
pub use repo::{RepoError, RepoResult};
pub use service::catalog_service::{CatalogService, CatalogServiceError};
pub use service::customer_service::{
    CustomerService, CustomerServiceError, RegisterCustomerRequest,
};
pub use service::order_service::{OrderService, OrderServiceError, OrderWithDetails};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
