//! Order, order line and order history records.
//!
//! # Invariants
//! - `Order::total_amount >= 0`.
//! - `OrderDetail::quantity > 0` and `unit_price >= 0`.
//! - `OrderDetail::customer_id` duplicates the owning order's customer.
//! - `OrderHistoryEntry` is read-only; rows are produced by the audit trigger.

use super::catalog::ProductId;
use super::customer::CustomerId;
use super::{require_non_negative, ModelValidationError, Money};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

pub type OrderId = Uuid;
pub type OrderDetailId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub customer_id: CustomerId,
    /// Unix epoch milliseconds.
    pub order_date: i64,
    pub total_amount: Money,
}

impl Order {
    /// Creates an empty order dated now with a generated ID.
    pub fn new(customer_id: CustomerId) -> Self {
        Self {
            order_id: Uuid::new_v4(),
            customer_id,
            order_date: now_epoch_ms(),
            total_amount: 0,
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        require_non_negative("total_amount", self.total_amount)
    }
}

/// One line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetail {
    pub order_detail_id: OrderDetailId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub customer_id: CustomerId,
    pub quantity: i64,
    /// Product price captured when the line was written.
    pub unit_price: Money,
}

impl OrderDetail {
    /// Creates a line for `order` with a generated ID.
    pub fn new(order: &Order, product_id: ProductId, quantity: i64, unit_price: Money) -> Self {
        Self {
            order_detail_id: Uuid::new_v4(),
            order_id: order.order_id,
            product_id,
            customer_id: order.customer_id,
            quantity,
            unit_price,
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        if self.quantity <= 0 {
            return Err(ModelValidationError::NonPositiveQuantity(self.quantity));
        }
        require_non_negative("unit_price", self.unit_price)
    }

    /// `quantity * unit_price`, or `None` on overflow.
    pub fn line_total(&self) -> Option<Money> {
        self.quantity.checked_mul(self.unit_price)
    }
}

/// Audit copy of one `order_details` row enriched with order metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderHistoryEntry {
    pub order_detail_id: OrderDetailId,
    pub customer_id: CustomerId,
    pub order_date: i64,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: i64,
    pub unit_price: Money,
}

/// Current wall clock in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::{Order, OrderDetail};
    use crate::model::ModelValidationError;
    use uuid::Uuid;

    #[test]
    fn detail_copies_order_identity() {
        let order = Order::new(Uuid::new_v4());
        let line = OrderDetail::new(&order, 4, 2, 150);
        assert_eq!(line.order_id, order.order_id);
        assert_eq!(line.customer_id, order.customer_id);
        assert_eq!(line.line_total(), Some(300));
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let order = Order::new(Uuid::new_v4());
        let line = OrderDetail::new(&order, 4, 0, 150);
        assert_eq!(
            line.validate(),
            Err(ModelValidationError::NonPositiveQuantity(0))
        );
    }

    #[test]
    fn line_total_reports_overflow() {
        let order = Order::new(Uuid::new_v4());
        let line = OrderDetail::new(&order, 4, i64::MAX, 2);
        assert_eq!(line.line_total(), None);
    }
}
