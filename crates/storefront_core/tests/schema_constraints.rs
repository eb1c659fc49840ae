use rusqlite::{params, Connection, ErrorCode};
use storefront_core::db::open_db_in_memory;
use storefront_core::report::analytics::{low_stock_products, unsold_products};
use storefront_core::{
    CatalogRepository, Customer, CustomerRepository, NewProduct, ProductListQuery, RepoError,
    SqliteCatalogRepository, SqliteCustomerRepository,
};

const CUSTOMER_ID: &str = "11111111-2222-4333-8444-555555555555";
const ORDER_ID: &str = "aaaaaaaa-bbbb-4ccc-8ddd-eeeeeeeeeeee";

#[test]
fn product_stock_cannot_go_negative() {
    let conn = open_db_in_memory().unwrap();
    let product_id = seed_product(&conn, 2);

    assert_constraint(conn.execute(
        "INSERT INTO product (category_id, name, price, stock_quantity, sold_by)
         VALUES (1, 'Broken', 100, -1, 'Seller');",
        [],
    ));
    assert_constraint(conn.execute(
        "UPDATE product SET stock_quantity = stock_quantity - 3 WHERE product_id = ?1;",
        [product_id],
    ));

    let stock: i64 = conn
        .query_row(
            "SELECT stock_quantity FROM product WHERE product_id = ?1;",
            [product_id],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(stock, 2);
}

#[test]
fn order_detail_quantity_must_be_positive() {
    let conn = open_db_in_memory().unwrap();
    let product_id = seed_product(&conn, 10);
    seed_customer_and_order(&conn);

    assert_constraint(insert_detail(&conn, "d-zero", ORDER_ID, product_id, 0));
    assert_constraint(insert_detail(&conn, "d-negative", ORDER_ID, product_id, -2));

    insert_detail(&conn, "d-ok", ORDER_ID, product_id, 1).unwrap();
    assert_constraint(conn.execute(
        "UPDATE order_details SET quantity = 0 WHERE order_detail_id = 'd-ok';",
        [],
    ));
}

#[test]
fn order_details_require_existing_order_and_product() {
    let conn = open_db_in_memory().unwrap();
    let product_id = seed_product(&conn, 10);
    seed_customer_and_order(&conn);

    assert_constraint(insert_detail(
        &conn,
        "d-orphan-order",
        "00000000-0000-4000-8000-000000000000",
        product_id,
        1,
    ));
    assert_constraint(insert_detail(&conn, "d-orphan-product", ORDER_ID, 9_999, 1));
}

#[test]
fn customer_email_must_match_pattern() {
    let conn = open_db_in_memory().unwrap();

    for email in ["plainaddress", "missing@tld", "two@@example.com", ""] {
        assert_constraint(conn.execute(
            "INSERT INTO customer (customer_id, first_name, last_name, email, password)
             VALUES (?1, 'Ada', 'Lovelace', ?2, 'hash');",
            params![format!("id-{email}"), email],
        ));
    }

    conn.execute(
        "INSERT INTO customer (customer_id, first_name, last_name, email, password)
         VALUES ('ok', 'Ada', 'Lovelace', 'ada@example.com', 'hash');",
        [],
    )
    .unwrap();
    assert_constraint(conn.execute(
        "UPDATE customer SET email = 'not-an-email' WHERE customer_id = 'ok';",
        [],
    ));
}

#[test]
fn order_history_is_append_only_and_trigger_owned() {
    let conn = open_db_in_memory().unwrap();
    let product_id = seed_product(&conn, 10);
    seed_customer_and_order(&conn);

    assert_constraint(conn.execute(
        "INSERT INTO order_history (
            order_detail_id, customer_id, order_date, order_id, product_id, quantity, unit_price
         ) VALUES ('forged', ?1, 0, ?2, ?3, 1, 100);",
        params![CUSTOMER_ID, ORDER_ID, product_id],
    ));

    insert_detail(&conn, "d-1", ORDER_ID, product_id, 1).unwrap();
    assert_constraint(conn.execute(
        "UPDATE order_history SET quantity = 50 WHERE order_detail_id = 'd-1';",
        [],
    ));
    assert_constraint(conn.execute(
        "DELETE FROM order_history WHERE order_detail_id = 'd-1';",
        [],
    ));

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM order_history;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn repositories_surface_engine_failures_as_constraint_violations() {
    let conn = open_db_in_memory().unwrap();
    let catalog = SqliteCatalogRepository::try_new(&conn).unwrap();
    let err = catalog
        .create_product(&NewProduct {
            category_id: 42,
            name: "Orphan".to_string(),
            description: None,
            price: 100,
            stock_quantity: 1,
            sold_by: "Seller".to_string(),
        })
        .unwrap_err();
    assert!(matches!(err, RepoError::ConstraintViolation(_)), "{err}");

    let customers = SqliteCustomerRepository::try_new(&conn).unwrap();
    customers
        .create_customer(&Customer::new("Ada", "Lovelace", "ada@example.com", "hash"))
        .unwrap();
    let err = customers
        .create_customer(&Customer::new("Ada", "Byron", "ada@example.com", "hash"))
        .unwrap_err();
    assert!(matches!(err, RepoError::ConstraintViolation(_)), "{err}");
}

#[test]
fn repositories_validate_before_writing() {
    let conn = open_db_in_memory().unwrap();
    let customers = SqliteCustomerRepository::try_new(&conn).unwrap();
    let err = customers
        .create_customer(&Customer::new("Ada", "Lovelace", "ada-at-example", "hash"))
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
}

#[test]
fn repositories_reject_unmigrated_connections() {
    let conn = Connection::open_in_memory().unwrap();
    let err = SqliteCatalogRepository::try_new(&conn).err().unwrap();
    assert!(matches!(
        err,
        RepoError::UninitializedConnection {
            actual_version: 0,
            ..
        }
    ));
}

#[test]
fn rows_accepted_by_checks_are_readable() {
    let conn = open_db_in_memory().unwrap();
    seed_product(&conn, 1);
    conn.execute(
        "INSERT INTO product (category_id, name, price, stock_quantity, sold_by)
         VALUES (1, char(9), 100, 0, 'Seller');",
        [],
    )
    .unwrap();
    let tab_id = conn.last_insert_rowid();
    conn.execute(
        "INSERT INTO customer (customer_id, first_name, last_name, email, password)
         VALUES (?1, char(9), 'Lovelace', 'ada@example.com', 'hash');",
        [CUSTOMER_ID],
    )
    .unwrap();

    let catalog = SqliteCatalogRepository::try_new(&conn).unwrap();
    let products = catalog.list_products(&ProductListQuery::default()).unwrap();
    assert_eq!(products.len(), 2);
    assert_eq!(catalog.get_product(tab_id).unwrap().unwrap().name, "\t");
    assert_eq!(low_stock_products(&conn, 0).unwrap()[0].product_id, tab_id);
    assert_eq!(unsold_products(&conn).unwrap().len(), 2);

    let customers = SqliteCustomerRepository::try_new(&conn).unwrap();
    let listed = customers.list_customers().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].first_name, "\t");
}

#[test]
fn space_only_text_is_rejected_by_engine_and_model() {
    let conn = open_db_in_memory().unwrap();
    seed_product(&conn, 1);
    assert_constraint(conn.execute(
        "INSERT INTO product (category_id, name, price, stock_quantity, sold_by)
         VALUES (1, '   ', 100, 0, 'Seller');",
        [],
    ));

    let catalog = SqliteCatalogRepository::try_new(&conn).unwrap();
    let err = catalog
        .create_product(&NewProduct {
            category_id: 1,
            name: "   ".to_string(),
            description: None,
            price: 100,
            stock_quantity: 0,
            sold_by: "Seller".to_string(),
        })
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
}

#[test]
fn email_uniqueness_ignores_case() {
    let conn = open_db_in_memory().unwrap();
    let customers = SqliteCustomerRepository::try_new(&conn).unwrap();
    let first = Customer::new("Ada", "Lovelace", "Ada@Example.com", "hash");
    customers.create_customer(&first).unwrap();

    let err = customers
        .create_customer(&Customer::new("Ada", "Byron", "ada@example.com", "hash"))
        .unwrap_err();
    assert!(matches!(err, RepoError::ConstraintViolation(_)), "{err}");

    let found = customers.find_by_email("ADA@EXAMPLE.COM").unwrap().unwrap();
    assert_eq!(found.customer_id, first.customer_id);
    assert_eq!(customers.list_customers().unwrap().len(), 1);
}

fn assert_constraint(result: rusqlite::Result<usize>) {
    match result {
        Err(rusqlite::Error::SqliteFailure(err, _)) => {
            assert_eq!(err.code, ErrorCode::ConstraintViolation)
        }
        other => panic!("expected constraint violation, got {other:?}"),
    }
}

fn seed_product(conn: &Connection, stock_quantity: i64) -> i64 {
    conn.execute(
        "INSERT OR IGNORE INTO category (category_id, category_name) VALUES (1, 'General');",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO product (category_id, name, price, stock_quantity, sold_by)
         VALUES (1, 'Widget', 250, ?1, 'Seller');",
        [stock_quantity],
    )
    .unwrap();
    conn.last_insert_rowid()
}

fn seed_customer_and_order(conn: &Connection) {
    conn.execute(
        "INSERT INTO customer (customer_id, first_name, last_name, email, password)
         VALUES (?1, 'Ada', 'Lovelace', 'ada@example.com', 'hash');",
        [CUSTOMER_ID],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO orders (order_id, customer_id, order_date, total_amount)
         VALUES (?1, ?2, 1700000000000, 0);",
        [ORDER_ID, CUSTOMER_ID],
    )
    .unwrap();
}

fn insert_detail(
    conn: &Connection,
    detail_id: &str,
    order_id: &str,
    product_id: i64,
    quantity: i64,
) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO order_details (
            order_detail_id, order_id, product_id, customer_id, quantity, unit_price
         ) VALUES (?1, ?2, ?3, ?4, ?5, 250);",
        params![detail_id, order_id, product_id, CUSTOMER_ID, quantity],
    )
}
