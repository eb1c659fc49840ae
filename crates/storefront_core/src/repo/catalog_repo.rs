//! Category/product repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over `category` and `product`.
//! - Own stock mutations so the `stock_quantity >= 0` check surfaces as a
//!   semantic error.
//!
//! # Invariants
//! - Product listing is deterministic: `name ASC, product_id ASC`.
//! - Stock updates never bypass the schema check constraint.

use crate::model::catalog::{
    validate_category_name, Category, CategoryId, NewProduct, Product, ProductId,
};
use crate::model::ModelValidationError;
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

const PRODUCT_SELECT_SQL: &str = "SELECT
    product_id,
    category_id,
    name,
    description,
    price,
    stock_quantity,
    sold_by
FROM product";

/// Query options for listing products.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductListQuery {
    pub category_id: Option<CategoryId>,
    /// Only products with at least one unit in stock.
    pub in_stock_only: bool,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for catalog operations.
pub trait CatalogRepository {
    fn create_category(&self, category_name: &str) -> RepoResult<Category>;
    fn get_category(&self, id: CategoryId) -> RepoResult<Option<Category>>;
    fn list_categories(&self) -> RepoResult<Vec<Category>>;
    fn create_product(&self, product: &NewProduct) -> RepoResult<Product>;
    fn get_product(&self, id: ProductId) -> RepoResult<Option<Product>>;
    fn list_products(&self, query: &ProductListQuery) -> RepoResult<Vec<Product>>;
    /// Overwrites the stock level of one product.
    fn set_stock(&self, id: ProductId, stock_quantity: i64) -> RepoResult<()>;
    /// Adds `delta` (may be negative) to stock and returns the new level.
    fn adjust_stock(&self, id: ProductId, delta: i64) -> RepoResult<i64>;
}

/// SQLite-backed catalog repository.
pub struct SqliteCatalogRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCatalogRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["category", "product"])?;
        Ok(Self { conn })
    }
}

impl CatalogRepository for SqliteCatalogRepository<'_> {
    fn create_category(&self, category_name: &str) -> RepoResult<Category> {
        let category_name = category_name.trim();
        validate_category_name(category_name)?;

        self.conn.execute(
            "INSERT INTO category (category_name) VALUES (?1);",
            [category_name],
        )?;

        Ok(Category {
            category_id: self.conn.last_insert_rowid(),
            category_name: category_name.to_string(),
        })
    }

    fn get_category(&self, id: CategoryId) -> RepoResult<Option<Category>> {
        let category = self
            .conn
            .query_row(
                "SELECT category_id, category_name FROM category WHERE category_id = ?1;",
                [id],
                |row| {
                    Ok(Category {
                        category_id: row.get("category_id")?,
                        category_name: row.get("category_name")?,
                    })
                },
            )
            .optional()?;
        Ok(category)
    }

    fn list_categories(&self) -> RepoResult<Vec<Category>> {
        let mut stmt = self.conn.prepare(
            "SELECT category_id, category_name
             FROM category
             ORDER BY category_name COLLATE NOCASE ASC, category_id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut categories = Vec::new();
        while let Some(row) = rows.next()? {
            categories.push(Category {
                category_id: row.get("category_id")?,
                category_name: row.get("category_name")?,
            });
        }
        Ok(categories)
    }

    fn create_product(&self, product: &NewProduct) -> RepoResult<Product> {
        product.validate()?;

        self.conn.execute(
            "INSERT INTO product (
                category_id,
                name,
                description,
                price,
                stock_quantity,
                sold_by
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                product.category_id,
                product.name.as_str(),
                product.description.as_deref(),
                product.price,
                product.stock_quantity,
                product.sold_by.as_str(),
            ],
        )?;

        Ok(product.clone().into_product(self.conn.last_insert_rowid()))
    }

    fn get_product(&self, id: ProductId) -> RepoResult<Option<Product>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PRODUCT_SELECT_SQL} WHERE product_id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_product_row(row)?));
        }
        Ok(None)
    }

    fn list_products(&self, query: &ProductListQuery) -> RepoResult<Vec<Product>> {
        let mut sql = format!("{PRODUCT_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(category_id) = query.category_id {
            sql.push_str(" AND category_id = ?");
            bind_values.push(Value::Integer(category_id));
        }

        if query.in_stock_only {
            sql.push_str(" AND stock_quantity > 0");
        }

        sql.push_str(" ORDER BY name COLLATE NOCASE ASC, product_id ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut products = Vec::new();
        while let Some(row) = rows.next()? {
            products.push(parse_product_row(row)?);
        }
        Ok(products)
    }

    fn set_stock(&self, id: ProductId, stock_quantity: i64) -> RepoResult<()> {
        if stock_quantity < 0 {
            return Err(ModelValidationError::Negative {
                field: "stock_quantity",
                value: stock_quantity,
            }
            .into());
        }

        let changed = self.conn.execute(
            "UPDATE product SET stock_quantity = ?2 WHERE product_id = ?1;",
            params![id, stock_quantity],
        )?;
        if changed == 0 {
            return Err(RepoError::not_found("product", id));
        }
        Ok(())
    }

    fn adjust_stock(&self, id: ProductId, delta: i64) -> RepoResult<i64> {
        let current: Option<i64> = self
            .conn
            .query_row(
                "SELECT stock_quantity FROM product WHERE product_id = ?1;",
                [id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(current) = current else {
            return Err(RepoError::not_found("product", id));
        };

        if current.checked_add(delta).map_or(true, |next| next < 0) {
            return Err(RepoError::InsufficientStock {
                product_id: id,
                requested: delta.saturating_neg(),
                available: current,
            });
        }

        let updated: i64 = self.conn.query_row(
            "UPDATE product
             SET stock_quantity = stock_quantity + ?2
             WHERE product_id = ?1
             RETURNING stock_quantity;",
            params![id, delta],
            |row| row.get(0),
        )?;
        Ok(updated)
    }
}

pub(crate) fn parse_product_row(row: &Row<'_>) -> RepoResult<Product> {
    let product = Product {
        product_id: row.get("product_id")?,
        category_id: row.get("category_id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        price: row.get("price")?,
        stock_quantity: row.get("stock_quantity")?,
        sold_by: row.get("sold_by")?,
    };
    product.validate().map_err(|err| {
        RepoError::InvalidData(format!(
            "product {} violates schema checks: {err}",
            product.product_id
        ))
    })?;
    Ok(product)
}
