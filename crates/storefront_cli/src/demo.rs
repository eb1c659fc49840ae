//! Demo data set for local exploration of the reports.

use anyhow::{bail, Result};
use log::info;
use rusqlite::Connection;
use serde::Serialize;
use storefront_core::{
    CatalogRepository, CatalogService, CustomerService, NewProduct, OrderLine, OrderService,
    RegisterCustomerRequest, SqliteCatalogRepository, SqliteCustomerRepository,
    SqliteOrderRepository,
};

#[derive(Debug, Serialize)]
pub struct SeedSummary {
    pub categories: usize,
    pub products: usize,
    pub customers: usize,
    pub orders: usize,
}

const CATALOG: &[(&str, &[(&str, i64, i64, &str)])] = &[
    (
        "Books",
        &[
            ("Systems Programming Primer", 3_900, 12, "Harbor Press"),
            ("Relational Design Handbook", 4_500, 3, "Harbor Press"),
        ],
    ),
    (
        "Kitchen",
        &[
            ("Cast Iron Skillet", 2_999, 8, "Forge & Co"),
            ("Pour-over Kettle", 5_450, 0, "Forge & Co"),
        ],
    ),
    ("Garden", &[("Pruning Shears", 1_850, 20, "Greenline")]),
];

const CUSTOMERS: &[(&str, &str, &str)] = &[
    ("Ada", "Lovelace", "ada@example.com"),
    ("Grace", "Hopper", "grace@example.com"),
    ("Edsger", "Dijkstra", "edsger@example.com"),
];

/// Inserts the demo data set into an empty database.
pub fn seed(conn: &mut Connection) -> Result<SeedSummary> {
    let mut product_ids = Vec::new();
    let category_count;
    {
        let repo = SqliteCatalogRepository::try_new(conn)?;
        if !repo.list_categories()?.is_empty() {
            bail!("database already contains catalog data; refusing to seed");
        }
        let catalog = CatalogService::new(repo);
        for (category_name, products) in CATALOG {
            let category = catalog.add_category(category_name)?;
            for (name, price, stock_quantity, sold_by) in products.iter() {
                let product = catalog.add_product(&NewProduct {
                    category_id: category.category_id,
                    name: (*name).to_string(),
                    description: None,
                    price: *price,
                    stock_quantity: *stock_quantity,
                    sold_by: (*sold_by).to_string(),
                })?;
                product_ids.push(product.product_id);
            }
        }
        category_count = CATALOG.len();
    }

    let mut customer_ids = Vec::new();
    {
        let customers = CustomerService::new(SqliteCustomerRepository::try_new(conn)?);
        for (first_name, last_name, email) in CUSTOMERS {
            let customer = customers.register(&RegisterCustomerRequest {
                first_name: (*first_name).to_string(),
                last_name: (*last_name).to_string(),
                email: (*email).to_string(),
                password: "demo-password-hash".to_string(),
            })?;
            customer_ids.push(customer.customer_id);
        }
    }

    let mut orders = OrderService::new(SqliteOrderRepository::try_new(conn)?);
    let plans: [(usize, &[(usize, i64)]); 4] = [
        (0, &[(0, 2), (2, 1)]),
        (0, &[(1, 1)]),
        (1, &[(4, 3)]),
        (2, &[(0, 1)]),
    ];
    for (customer_index, lines) in plans {
        let lines = lines
            .iter()
            .map(|(product_index, quantity)| OrderLine {
                product_id: product_ids[*product_index],
                quantity: *quantity,
            })
            .collect::<Vec<_>>();
        orders.place_order(customer_ids[customer_index], &lines)?;
    }

    let summary = SeedSummary {
        categories: category_count,
        products: product_ids.len(),
        customers: customer_ids.len(),
        orders: plans.len(),
    };
    info!(
        "event=seed_demo module=cli status=ok categories={} products={} customers={} orders={}",
        summary.categories, summary.products, summary.customers, summary.orders
    );
    Ok(summary)
}
