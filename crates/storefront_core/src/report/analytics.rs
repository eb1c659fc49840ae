//! Sales and inventory reports.
//!
//! Revenue is computed from `order_details` (`quantity * unit_price`), so it
//! reflects the price captured at order time rather than the current list
//! price.

use crate::model::catalog::{CategoryId, Product, ProductId};
use crate::model::customer::CustomerId;
use crate::model::order::OrderId;
use crate::model::Money;
use crate::repo::catalog_repo::parse_product_row;
use crate::repo::{parse_uuid, RepoResult};
use rusqlite::{Connection, Row};
use serde::Serialize;

pub type ReportResult<T> = RepoResult<T>;

/// Revenue and units sold per category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySales {
    pub category_id: CategoryId,
    pub category_name: String,
    pub units_sold: i64,
    pub revenue: Money,
}

/// Aggregated spend of one customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerSpend {
    pub customer_id: CustomerId,
    pub first_name: String,
    pub last_name: String,
    pub order_count: i64,
    pub total_spent: Money,
}

/// Units and revenue of one product across all orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductSales {
    pub product_id: ProductId,
    pub name: String,
    pub units_sold: i64,
    pub revenue: Money,
}

/// One audit row joined with its product name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryLine {
    pub order_id: OrderId,
    pub order_date: i64,
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub line_total: Money,
}

/// Revenue per category, including categories without sales.
///
/// Ordered by `revenue DESC, category_name ASC`.
pub fn sales_by_category(conn: &Connection) -> ReportResult<Vec<CategorySales>> {
    let mut stmt = conn.prepare(
        "SELECT
            c.category_id,
            c.category_name,
            COALESCE(SUM(od.quantity), 0) AS units_sold,
            COALESCE(SUM(od.quantity * od.unit_price), 0) AS revenue
         FROM category c
         LEFT JOIN product p ON p.category_id = c.category_id
         LEFT JOIN order_details od ON od.product_id = p.product_id
         GROUP BY c.category_id, c.category_name
         ORDER BY revenue DESC, c.category_name ASC, c.category_id ASC;",
    )?;
    let mut rows = stmt.query([])?;
    let mut report = Vec::new();
    while let Some(row) = rows.next()? {
        report.push(CategorySales {
            category_id: row.get("category_id")?,
            category_name: row.get("category_name")?,
            units_sold: row.get("units_sold")?,
            revenue: row.get("revenue")?,
        });
    }
    Ok(report)
}

/// Customers ranked by total order amount; customers without orders are
/// omitted.
pub fn top_customers(conn: &Connection, limit: u32) -> ReportResult<Vec<CustomerSpend>> {
    let mut stmt = conn.prepare(
        "SELECT
            cu.customer_id,
            cu.first_name,
            cu.last_name,
            COUNT(o.order_id) AS order_count,
            SUM(o.total_amount) AS total_spent
         FROM customer cu
         INNER JOIN orders o ON o.customer_id = cu.customer_id
         GROUP BY cu.customer_id, cu.first_name, cu.last_name
         ORDER BY total_spent DESC, cu.customer_id ASC
         LIMIT ?1;",
    )?;
    let mut rows = stmt.query([i64::from(limit)])?;
    let mut report = Vec::new();
    while let Some(row) = rows.next()? {
        report.push(parse_customer_spend(row)?);
    }
    Ok(report)
}

/// Customers whose total spend is above the average spend of customers
/// who ordered at all.
pub fn customers_above_average_spend(conn: &Connection) -> ReportResult<Vec<CustomerSpend>> {
    let mut stmt = conn.prepare(
        "SELECT
            cu.customer_id,
            cu.first_name,
            cu.last_name,
            COUNT(o.order_id) AS order_count,
            SUM(o.total_amount) AS total_spent
         FROM customer cu
         INNER JOIN orders o ON o.customer_id = cu.customer_id
         GROUP BY cu.customer_id, cu.first_name, cu.last_name
         HAVING SUM(o.total_amount) > (
            SELECT AVG(per_customer.total)
            FROM (
                SELECT SUM(total_amount) AS total
                FROM orders
                GROUP BY customer_id
            ) AS per_customer
         )
         ORDER BY total_spent DESC, cu.customer_id ASC;",
    )?;
    let mut rows = stmt.query([])?;
    let mut report = Vec::new();
    while let Some(row) = rows.next()? {
        report.push(parse_customer_spend(row)?);
    }
    Ok(report)
}

/// Products ranked by units sold; unsold products are omitted.
pub fn best_selling_products(conn: &Connection, limit: u32) -> ReportResult<Vec<ProductSales>> {
    let mut stmt = conn.prepare(
        "SELECT
            p.product_id,
            p.name,
            SUM(od.quantity) AS units_sold,
            SUM(od.quantity * od.unit_price) AS revenue
         FROM product p
         INNER JOIN order_details od ON od.product_id = p.product_id
         GROUP BY p.product_id, p.name
         ORDER BY units_sold DESC, p.product_id ASC
         LIMIT ?1;",
    )?;
    let mut rows = stmt.query([i64::from(limit)])?;
    let mut report = Vec::new();
    while let Some(row) = rows.next()? {
        report.push(ProductSales {
            product_id: row.get("product_id")?,
            name: row.get("name")?,
            units_sold: row.get("units_sold")?,
            revenue: row.get("revenue")?,
        });
    }
    Ok(report)
}

/// Products that never appeared on any order line.
pub fn unsold_products(conn: &Connection) -> ReportResult<Vec<Product>> {
    let mut stmt = conn.prepare(
        "SELECT
            p.product_id,
            p.category_id,
            p.name,
            p.description,
            p.price,
            p.stock_quantity,
            p.sold_by
         FROM product p
         WHERE NOT EXISTS (
            SELECT 1 FROM order_details od WHERE od.product_id = p.product_id
         )
         ORDER BY p.name COLLATE NOCASE ASC, p.product_id ASC;",
    )?;
    let mut rows = stmt.query([])?;
    let mut products = Vec::new();
    while let Some(row) = rows.next()? {
        products.push(parse_product_row(row)?);
    }
    Ok(products)
}

/// Products with `stock_quantity <= threshold`, lowest stock first.
pub fn low_stock_products(conn: &Connection, threshold: i64) -> ReportResult<Vec<Product>> {
    let mut stmt = conn.prepare(
        "SELECT
            product_id,
            category_id,
            name,
            description,
            price,
            stock_quantity,
            sold_by
         FROM product
         WHERE stock_quantity <= ?1
         ORDER BY stock_quantity ASC, product_id ASC;",
    )?;
    let mut rows = stmt.query([threshold])?;
    let mut products = Vec::new();
    while let Some(row) = rows.next()? {
        products.push(parse_product_row(row)?);
    }
    Ok(products)
}

/// Purchase trail of one customer read from `order_history`.
pub fn customer_order_history(
    conn: &Connection,
    customer_id: CustomerId,
) -> ReportResult<Vec<HistoryLine>> {
    let mut stmt = conn.prepare(
        "SELECT
            h.order_id,
            h.order_date,
            h.product_id,
            p.name AS product_name,
            h.quantity,
            h.unit_price,
            h.quantity * h.unit_price AS line_total
         FROM order_history h
         INNER JOIN product p ON p.product_id = h.product_id
         WHERE h.customer_id = ?1
         ORDER BY h.order_date ASC, h.order_id ASC, h.product_id ASC;",
    )?;
    let mut rows = stmt.query([customer_id.to_string()])?;
    let mut lines = Vec::new();
    while let Some(row) = rows.next()? {
        let order_id: String = row.get("order_id")?;
        lines.push(HistoryLine {
            order_id: parse_uuid(&order_id, "order_history.order_id")?,
            order_date: row.get("order_date")?,
            product_id: row.get("product_id")?,
            product_name: row.get("product_name")?,
            quantity: row.get("quantity")?,
            unit_price: row.get("unit_price")?,
            line_total: row.get("line_total")?,
        });
    }
    Ok(lines)
}

fn parse_customer_spend(row: &Row<'_>) -> ReportResult<CustomerSpend> {
    let customer_id: String = row.get("customer_id")?;
    Ok(CustomerSpend {
        customer_id: parse_uuid(&customer_id, "customer.customer_id")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        order_count: row.get("order_count")?,
        total_spent: row.get("total_spent")?,
    })
}
