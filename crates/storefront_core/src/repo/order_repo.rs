//! Order/order line/history repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide persistence APIs over `orders` and `order_details`.
//! - Expose read access to the trigger-maintained `order_history` table.
//! - Own atomic order placement (stock reservation + order + lines).
//!
//! # Invariants
//! - `order_history` is never written from here; the `order_details_audit`
//!   trigger inserts exactly one history row per inserted line.
//! - `place_order` runs inside one `IMMEDIATE` transaction, which takes the
//!   database write lock before any product row is read. This is the SQLite
//!   counterpart of `SELECT ... FOR UPDATE` on the product rows.
//! - A failed placement leaves stock, orders, lines and history untouched.

use crate::model::catalog::ProductId;
use crate::model::customer::CustomerId;
use crate::model::order::{Order, OrderDetail, OrderDetailId, OrderHistoryEntry, OrderId};
use crate::model::{ModelValidationError, Money};
use crate::repo::{ensure_connection_ready, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::collections::BTreeMap;

const ORDER_SELECT_SQL: &str = "SELECT
    order_id,
    customer_id,
    order_date,
    total_amount
FROM orders";

const DETAIL_SELECT_SQL: &str = "SELECT
    order_detail_id,
    order_id,
    product_id,
    customer_id,
    quantity,
    unit_price
FROM order_details";

const HISTORY_SELECT_SQL: &str = "SELECT
    order_detail_id,
    customer_id,
    order_date,
    order_id,
    product_id,
    quantity,
    unit_price
FROM order_history";

/// Requested quantity of one product in a new order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// Result of an atomic order placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedOrder {
    pub order: Order,
    /// Lines in product id order.
    pub details: Vec<OrderDetail>,
}

/// Repository interface for order operations.
pub trait OrderRepository {
    /// Inserts an order header as-is.
    fn create_order(&self, order: &Order) -> RepoResult<OrderId>;
    fn get_order(&self, id: OrderId) -> RepoResult<Option<Order>>;
    /// Lists orders of one customer, newest first.
    fn list_orders_for_customer(&self, customer_id: CustomerId) -> RepoResult<Vec<Order>>;
    fn set_order_total(&self, id: OrderId, total_amount: Money) -> RepoResult<()>;
    /// Inserts one order line; the audit trigger writes its history row.
    fn add_order_detail(&self, detail: &OrderDetail) -> RepoResult<OrderDetailId>;
    fn list_order_details(&self, order_id: OrderId) -> RepoResult<Vec<OrderDetail>>;
    fn get_history_entry(&self, id: OrderDetailId) -> RepoResult<Option<OrderHistoryEntry>>;
    /// Lists audit rows of one customer ordered by `order_date ASC`.
    fn list_history_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> RepoResult<Vec<OrderHistoryEntry>>;
    /// Reserves stock and writes order + lines in one transaction.
    /// Duplicate product lines are merged before stock is checked.
    fn place_order(
        &mut self,
        customer_id: CustomerId,
        lines: &[OrderLine],
    ) -> RepoResult<PlacedOrder>;
}

/// SQLite-backed order repository.
pub struct SqliteOrderRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteOrderRepository<'conn> {
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_connection_ready(
            conn,
            &["product", "customer", "orders", "order_details", "order_history"],
        )?;
        Ok(Self { conn })
    }
}

impl OrderRepository for SqliteOrderRepository<'_> {
    fn create_order(&self, order: &Order) -> RepoResult<OrderId> {
        insert_order(self.conn, order)?;
        Ok(order.order_id)
    }

    fn get_order(&self, id: OrderId) -> RepoResult<Option<Order>> {
        let order = self
            .conn
            .query_row(
                &format!("{ORDER_SELECT_SQL} WHERE order_id = ?1;"),
                [id.to_string()],
                |row| Ok(parse_order_row(row)),
            )
            .optional()?;
        order.transpose()
    }

    fn list_orders_for_customer(&self, customer_id: CustomerId) -> RepoResult<Vec<Order>> {
        let mut stmt = self.conn.prepare(&format!(
            "{ORDER_SELECT_SQL}
             WHERE customer_id = ?1
             ORDER BY order_date DESC, order_id ASC;"
        ))?;
        let mut rows = stmt.query([customer_id.to_string()])?;
        let mut orders = Vec::new();
        while let Some(row) = rows.next()? {
            orders.push(parse_order_row(row)?);
        }
        Ok(orders)
    }

    fn set_order_total(&self, id: OrderId, total_amount: Money) -> RepoResult<()> {
        if total_amount < 0 {
            return Err(ModelValidationError::Negative {
                field: "total_amount",
                value: total_amount,
            }
            .into());
        }

        let changed = self.conn.execute(
            "UPDATE orders SET total_amount = ?2 WHERE order_id = ?1;",
            params![id.to_string(), total_amount],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("order", id));
        }
        Ok(())
    }

    fn add_order_detail(&self, detail: &OrderDetail) -> RepoResult<OrderDetailId> {
        insert_order_detail(self.conn, detail)?;
        Ok(detail.order_detail_id)
    }

    fn list_order_details(&self, order_id: OrderId) -> RepoResult<Vec<OrderDetail>> {
        let mut stmt = self.conn.prepare(&format!(
            "{DETAIL_SELECT_SQL}
             WHERE order_id = ?1
             ORDER BY product_id ASC, order_detail_id ASC;"
        ))?;
        let mut rows = stmt.query([order_id.to_string()])?;
        let mut details = Vec::new();
        while let Some(row) = rows.next()? {
            details.push(parse_detail_row(row)?);
        }
        Ok(details)
    }

    fn get_history_entry(&self, id: OrderDetailId) -> RepoResult<Option<OrderHistoryEntry>> {
        let entry = self
            .conn
            .query_row(
                &format!("{HISTORY_SELECT_SQL} WHERE order_detail_id = ?1;"),
                [id.to_string()],
                |row| Ok(parse_history_row(row)),
            )
            .optional()?;
        entry.transpose()
    }

    fn list_history_for_customer(
        &self,
        customer_id: CustomerId,
    ) -> RepoResult<Vec<OrderHistoryEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "{HISTORY_SELECT_SQL}
             WHERE customer_id = ?1
             ORDER BY order_date ASC, order_id ASC, product_id ASC;"
        ))?;
        let mut rows = stmt.query([customer_id.to_string()])?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_history_row(row)?);
        }
        Ok(entries)
    }

    fn place_order(
        &mut self,
        customer_id: CustomerId,
        lines: &[OrderLine],
    ) -> RepoResult<PlacedOrder> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        if !customer_exists_in_tx(&tx, customer_id)? {
            return Err(RepoError::not_found("customer", customer_id));
        }

        let lines = merge_order_lines(lines);
        let mut order = Order::new(customer_id);
        let mut details = Vec::with_capacity(lines.len());
        let mut total: Money = 0;
        for line in &lines {
            let Some((price, available)) = lock_product_in_tx(&tx, line.product_id)? else {
                return Err(RepoError::not_found("product", line.product_id));
            };
            if line.quantity > available {
                return Err(RepoError::InsufficientStock {
                    product_id: line.product_id,
                    requested: line.quantity,
                    available,
                });
            }

            let detail = OrderDetail::new(&order, line.product_id, line.quantity, price);
            detail.validate()?;
            total = detail
                .line_total()
                .and_then(|line_total| total.checked_add(line_total))
                .ok_or_else(|| {
                    RepoError::InvalidData(format!(
                        "order total overflows for customer {customer_id}"
                    ))
                })?;
            details.push(detail);
        }
        order.total_amount = total;

        insert_order(&tx, &order)?;
        for detail in &details {
            tx.execute(
                "UPDATE product
                 SET stock_quantity = stock_quantity - ?2
                 WHERE product_id = ?1;",
                params![detail.product_id, detail.quantity],
            )?;
            insert_order_detail(&tx, detail)?;
        }

        tx.commit()?;
        Ok(PlacedOrder { order, details })
    }
}

/// Merges duplicate product lines and orders them by product id.
///
/// Summing keeps one `order_details` row per product in an order.
pub fn merge_order_lines(lines: &[OrderLine]) -> Vec<OrderLine> {
    let mut merged = BTreeMap::<ProductId, i64>::new();
    for line in lines {
        let quantity = merged.entry(line.product_id).or_insert(0);
        *quantity = quantity.saturating_add(line.quantity);
    }
    merged
        .into_iter()
        .map(|(product_id, quantity)| OrderLine {
            product_id,
            quantity,
        })
        .collect()
}

fn insert_order(conn: &Connection, order: &Order) -> RepoResult<()> {
    order.validate()?;
    conn.execute(
        "INSERT INTO orders (
            order_id,
            customer_id,
            order_date,
            total_amount
        ) VALUES (?1, ?2, ?3, ?4);",
        params![
            order.order_id.to_string(),
            order.customer_id.to_string(),
            order.order_date,
            order.total_amount,
        ],
    )?;
    Ok(())
}

fn insert_order_detail(conn: &Connection, detail: &OrderDetail) -> RepoResult<()> {
    detail.validate()?;
    conn.execute(
        "INSERT INTO order_details (
            order_detail_id,
            order_id,
            product_id,
            customer_id,
            quantity,
            unit_price
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
        params![
            detail.order_detail_id.to_string(),
            detail.order_id.to_string(),
            detail.product_id,
            detail.customer_id.to_string(),
            detail.quantity,
            detail.unit_price,
        ],
    )?;
    Ok(())
}

fn customer_exists_in_tx(tx: &Transaction<'_>, customer_id: CustomerId) -> RepoResult<bool> {
    let exists: i64 = tx.query_row(
        "SELECT EXISTS(SELECT 1 FROM customer WHERE customer_id = ?1);",
        [customer_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

/// Reads `(price, stock_quantity)` of a product under the transaction's
/// write lock.
fn lock_product_in_tx(
    tx: &Transaction<'_>,
    product_id: ProductId,
) -> RepoResult<Option<(Money, i64)>> {
    let row = tx
        .query_row(
            "SELECT price, stock_quantity FROM product WHERE product_id = ?1;",
            [product_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;
    Ok(row)
}

fn parse_order_row(row: &Row<'_>) -> RepoResult<Order> {
    let order_id: String = row.get("order_id")?;
    let customer_id: String = row.get("customer_id")?;
    Ok(Order {
        order_id: parse_uuid(&order_id, "orders.order_id")?,
        customer_id: parse_uuid(&customer_id, "orders.customer_id")?,
        order_date: row.get("order_date")?,
        total_amount: row.get("total_amount")?,
    })
}

fn parse_detail_row(row: &Row<'_>) -> RepoResult<OrderDetail> {
    let detail_id: String = row.get("order_detail_id")?;
    let order_id: String = row.get("order_id")?;
    let customer_id: String = row.get("customer_id")?;
    Ok(OrderDetail {
        order_detail_id: parse_uuid(&detail_id, "order_details.order_detail_id")?,
        order_id: parse_uuid(&order_id, "order_details.order_id")?,
        product_id: row.get("product_id")?,
        customer_id: parse_uuid(&customer_id, "order_details.customer_id")?,
        quantity: row.get("quantity")?,
        unit_price: row.get("unit_price")?,
    })
}

fn parse_history_row(row: &Row<'_>) -> RepoResult<OrderHistoryEntry> {
    let detail_id: String = row.get("order_detail_id")?;
    let order_id: String = row.get("order_id")?;
    let customer_id: String = row.get("customer_id")?;
    Ok(OrderHistoryEntry {
        order_detail_id: parse_uuid(&detail_id, "order_history.order_detail_id")?,
        customer_id: parse_uuid(&customer_id, "order_history.customer_id")?,
        order_date: row.get("order_date")?,
        order_id: parse_uuid(&order_id, "order_history.order_id")?,
        product_id: row.get("product_id")?,
        quantity: row.get("quantity")?,
        unit_price: row.get("unit_price")?,
    })
}
