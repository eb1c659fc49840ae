//! Order use-case service.
//!
//! # Responsibility
//! - Validate and normalize order requests before placement.
//! - Map repository failures to order-level errors.
//!
//! # Invariants
//! - Orders contain at least one line with positive quantity.
//! - Duplicate product lines are merged by the repository before placement.
//! - Placement is all-or-nothing (see `OrderRepository::place_order`).

use crate::model::catalog::ProductId;
use crate::model::customer::CustomerId;
use crate::model::order::{Order, OrderDetail, OrderHistoryEntry, OrderId};
use crate::repo::order_repo::{OrderLine, OrderRepository, PlacedOrder};
use crate::repo::{RepoError, RepoResult};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

#[derive(Debug)]
pub enum OrderServiceError {
    /// Request has no lines.
    EmptyOrder,
    /// A line asks for zero or negative units.
    InvalidQuantity { product_id: ProductId, quantity: i64 },
    CustomerNotFound(String),
    ProductNotFound(String),
    OrderNotFound(OrderId),
    InsufficientStock {
        product_id: ProductId,
        requested: i64,
        available: i64,
    },
    Repo(RepoError),
}

impl Display for OrderServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyOrder => write!(f, "order must contain at least one line"),
            Self::InvalidQuantity {
                product_id,
                quantity,
            } => write!(
                f,
                "quantity for product {product_id} must be > 0, got {quantity}"
            ),
            Self::CustomerNotFound(id) => write!(f, "customer not found: {id}"),
            Self::ProductNotFound(id) => write!(f, "product not found: {id}"),
            Self::OrderNotFound(id) => write!(f, "order not found: {id}"),
            Self::InsufficientStock {
                product_id,
                requested,
                available,
            } => write!(
                f,
                "insufficient stock for product {product_id}: requested {requested}, available {available}"
            ),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for OrderServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for OrderServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound {
                entity: "customer",
                id,
            } => Self::CustomerNotFound(id),
            RepoError::NotFound {
                entity: "product",
                id,
            } => Self::ProductNotFound(id),
            RepoError::InsufficientStock {
                product_id,
                requested,
                available,
            } => Self::InsufficientStock {
                product_id,
                requested,
                available,
            },
            other => Self::Repo(other),
        }
    }
}

/// An order header with its lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderWithDetails {
    pub order: Order,
    pub details: Vec<OrderDetail>,
}

impl From<PlacedOrder> for OrderWithDetails {
    fn from(value: PlacedOrder) -> Self {
        Self {
            order: value.order,
            details: value.details,
        }
    }
}

pub struct OrderService<R: OrderRepository> {
    repo: R,
}

impl<R: OrderRepository> OrderService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Places an order for `customer_id`.
    ///
    /// # Contract
    /// - Rejects empty requests and non-positive quantities before touching
    ///   storage.
    /// - `total_amount` is the sum of `quantity * price` at placement time.
    /// - On any error no stock, order, line or history row is written.
    pub fn place_order(
        &mut self,
        customer_id: CustomerId,
        lines: &[OrderLine],
    ) -> Result<OrderWithDetails, OrderServiceError> {
        let started_at = Instant::now();
        if lines.is_empty() {
            return Err(OrderServiceError::EmptyOrder);
        }
        if let Some(line) = lines.iter().find(|line| line.quantity <= 0) {
            return Err(OrderServiceError::InvalidQuantity {
                product_id: line.product_id,
                quantity: line.quantity,
            });
        }

        match self.repo.place_order(customer_id, lines) {
            Ok(placed) => {
                info!(
                    "event=order_place module=service status=ok order_id={} lines={} total_amount={} duration_ms={}",
                    placed.order.order_id,
                    placed.details.len(),
                    placed.order.total_amount,
                    started_at.elapsed().as_millis()
                );
                Ok(placed.into())
            }
            Err(err) => {
                warn!(
                    "event=order_place module=service status=error customer_id={} duration_ms={} error={}",
                    customer_id,
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err.into())
            }
        }
    }

    /// Loads one order with its lines.
    pub fn get_order(&self, order_id: OrderId) -> Result<OrderWithDetails, OrderServiceError> {
        let order = self
            .repo
            .get_order(order_id)?
            .ok_or(OrderServiceError::OrderNotFound(order_id))?;
        let details = self.repo.list_order_details(order_id)?;
        Ok(OrderWithDetails { order, details })
    }

    pub fn list_orders(&self, customer_id: CustomerId) -> RepoResult<Vec<Order>> {
        self.repo.list_orders_for_customer(customer_id)
    }

    /// Returns the audit trail of one customer, oldest first.
    pub fn order_history(&self, customer_id: CustomerId) -> RepoResult<Vec<OrderHistoryEntry>> {
        self.repo.list_history_for_customer(customer_id)
    }
}
