use rusqlite::Connection;
use storefront_core::db::open_db_in_memory;
use storefront_core::report::analytics::{
    best_selling_products, customer_order_history, customers_above_average_spend,
    low_stock_products, sales_by_category, top_customers, unsold_products,
};
use storefront_core::{
    CatalogRepository, Customer, CustomerId, CustomerRepository, NewProduct, OrderLine,
    OrderService, ProductId, SqliteCatalogRepository, SqliteCustomerRepository,
    SqliteOrderRepository,
};

struct Shop {
    ada: CustomerId,
    grace: CustomerId,
    edsger: CustomerId,
    novel: ProductId,
    atlas: ProductId,
    skillet: ProductId,
    kettle: ProductId,
}

/// Books: novel 1000 (stock 10), atlas 3000 (stock 2).
/// Kitchen: skillet 2500 (stock 6), kettle 5000 (stock 1, never sold).
/// Ada spends 2*1000 + 3000 = 5000 and 2500 = 7500 total in two orders.
/// Grace spends 3*1000 = 3000. Edsger spends 2500.
fn seed_shop(conn: &mut Connection) -> Shop {
    let (novel, atlas, skillet, kettle) = {
        let catalog = SqliteCatalogRepository::try_new(conn).unwrap();
        let books = catalog.create_category("Books").unwrap();
        let kitchen = catalog.create_category("Kitchen").unwrap();
        catalog.create_category("Garden").unwrap();
        let add = |category_id, name: &str, price, stock_quantity| {
            catalog
                .create_product(&NewProduct {
                    category_id,
                    name: name.to_string(),
                    description: None,
                    price,
                    stock_quantity,
                    sold_by: "Demo Seller".to_string(),
                })
                .unwrap()
                .product_id
        };
        (
            add(books.category_id, "Novel", 1_000, 10),
            add(books.category_id, "Atlas", 3_000, 2),
            add(kitchen.category_id, "Skillet", 2_500, 6),
            add(kitchen.category_id, "Kettle", 5_000, 1),
        )
    };

    let (ada, grace, edsger) = {
        let customers = SqliteCustomerRepository::try_new(conn).unwrap();
        let create = |first: &str, last: &str, email: &str| {
            customers
                .create_customer(&Customer::new(first, last, email, "hash"))
                .unwrap()
        };
        (
            create("Ada", "Lovelace", "ada@example.com"),
            create("Grace", "Hopper", "grace@example.com"),
            create("Edsger", "Dijkstra", "edsger@example.com"),
        )
    };

    let mut orders = OrderService::new(SqliteOrderRepository::try_new(conn).unwrap());
    let line = |product_id, quantity| OrderLine {
        product_id,
        quantity,
    };
    orders
        .place_order(ada, &[line(novel, 2), line(atlas, 1)])
        .unwrap();
    orders.place_order(ada, &[line(skillet, 1)]).unwrap();
    orders.place_order(grace, &[line(novel, 3)]).unwrap();
    orders.place_order(edsger, &[line(skillet, 1)]).unwrap();

    Shop {
        ada,
        grace,
        edsger,
        novel,
        atlas,
        skillet,
        kettle,
    }
}

#[test]
fn sales_by_category_includes_categories_without_sales() {
    let mut conn = open_db_in_memory().unwrap();
    seed_shop(&mut conn);

    let report = sales_by_category(&conn).unwrap();
    let rows = report
        .iter()
        .map(|row| (row.category_name.as_str(), row.units_sold, row.revenue))
        .collect::<Vec<_>>();
    assert_eq!(
        rows,
        vec![("Books", 6, 8_000), ("Kitchen", 2, 5_000), ("Garden", 0, 0)]
    );
}

#[test]
fn top_customers_ranks_by_total_spend() {
    let mut conn = open_db_in_memory().unwrap();
    let shop = seed_shop(&mut conn);

    let report = top_customers(&conn, 2).unwrap();
    assert_eq!(report.len(), 2);
    assert_eq!(report[0].customer_id, shop.ada);
    assert_eq!(report[0].order_count, 2);
    assert_eq!(report[0].total_spent, 7_500);
    assert_eq!(report[1].customer_id, shop.grace);
    assert_eq!(report[1].total_spent, 3_000);
}

#[test]
fn above_average_spend_uses_per_customer_average() {
    let mut conn = open_db_in_memory().unwrap();
    let shop = seed_shop(&mut conn);

    // Average of 7500, 3000 and 2500 is 4333.
    let report = customers_above_average_spend(&conn).unwrap();
    let ids = report.iter().map(|row| row.customer_id).collect::<Vec<_>>();
    assert_eq!(ids, vec![shop.ada]);
    assert!(!ids.contains(&shop.edsger));
}

#[test]
fn best_sellers_and_unsold_products_partition_the_catalog() {
    let mut conn = open_db_in_memory().unwrap();
    let shop = seed_shop(&mut conn);

    let best = best_selling_products(&conn, 10).unwrap();
    let ranked = best
        .iter()
        .map(|row| (row.product_id, row.units_sold, row.revenue))
        .collect::<Vec<_>>();
    assert_eq!(
        ranked,
        vec![
            (shop.novel, 5, 5_000),
            (shop.skillet, 2, 5_000),
            (shop.atlas, 1, 3_000),
        ]
    );

    let unsold = unsold_products(&conn).unwrap();
    assert_eq!(unsold.len(), 1);
    assert_eq!(unsold[0].product_id, shop.kettle);
}

#[test]
fn low_stock_lists_products_at_or_below_threshold() {
    let mut conn = open_db_in_memory().unwrap();
    let shop = seed_shop(&mut conn);

    // Stock after orders: novel 5, atlas 1, skillet 4, kettle 1.
    let low = low_stock_products(&conn, 1).unwrap();
    let ids = low.iter().map(|product| product.product_id).collect::<Vec<_>>();
    assert_eq!(ids, vec![shop.atlas, shop.kettle]);

    assert!(low_stock_products(&conn, 0).unwrap().is_empty());
    assert_eq!(low_stock_products(&conn, 5).unwrap().len(), 4);
}

#[test]
fn customer_history_reads_audit_rows_with_product_names() {
    let mut conn = open_db_in_memory().unwrap();
    let shop = seed_shop(&mut conn);

    let history = customer_order_history(&conn, shop.ada).unwrap();
    assert_eq!(history.len(), 3);
    let total: i64 = history.iter().map(|line| line.line_total).sum();
    assert_eq!(total, 7_500);
    assert!(history.iter().any(|line| line.product_name == "Atlas"));
    assert!(history.windows(2).all(|pair| pair[0].order_date <= pair[1].order_date));

    let grace = customer_order_history(&conn, shop.grace).unwrap();
    assert_eq!(grace.len(), 1);
    assert_eq!(grace[0].product_id, shop.novel);
    assert_eq!(grace[0].quantity, 3);
}
