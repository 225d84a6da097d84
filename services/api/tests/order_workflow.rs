//! Order placement and return scenarios against a real database.
//!
//! Each test empties the schema first, so they run serially.

mod support;

use api::{
    models::returns::NewReturn,
    repositories::{orders::OrderRepository, returns::ReturnRepository},
    workflow::WorkflowError,
};
use serial_test::serial;
use support::{ada, count, fresh_pool, manager, order_for, product};

#[tokio::test]
#[serial]
#[ignore = "requires a PostgreSQL database at DATABASE_URL"]
async fn test_orders_go_to_least_loaded_manager_and_reuse_customers() {
    let pool = fresh_pool().await;
    let orders = OrderRepository::new(pool.clone());

    let m1 = manager(&pool, "m1@example.com").await;
    let keyboard = product(&pool, "Keyboard", 40.0).await;
    let mouse = product(&pool, "Mouse", 15.5).await;

    let o1 = orders
        .place(&order_for(ada(), &[(keyboard, 1), (mouse, 2), (999_999, 1)]))
        .await
        .expect("first order");
    assert_eq!(o1.manager_id, m1);
    assert_eq!(
        o1.items.iter().map(|i| i.id).collect::<Vec<_>>(),
        vec![keyboard, mouse]
    );
    assert_eq!(o1.status, "processing");

    let o2 = orders
        .place(&order_for(ada(), &[(mouse, 1)]))
        .await
        .expect("second order");
    assert_ne!(o2.id, o1.id);
    assert_eq!(o2.customer, o1.customer);
    assert_eq!(count(&pool, "customers").await, 1);

    let m2 = manager(&pool, "m2@example.com").await;
    let o3 = orders
        .place(&order_for(ada(), &[(keyboard, 1)]))
        .await
        .expect("third order");
    assert_eq!(o3.manager_id, m2);
}

#[tokio::test]
#[serial]
#[ignore = "requires a PostgreSQL database at DATABASE_URL"]
async fn test_any_differing_identity_field_creates_a_new_customer() {
    let pool = fresh_pool().await;
    let orders = OrderRepository::new(pool.clone());
    manager(&pool, "m1@example.com").await;

    let first = orders.place(&order_for(ada(), &[])).await.expect("order");
    assert!(first.items.is_empty());

    let mut other = ada();
    other.phone_number += 1;
    let second = orders.place(&order_for(other, &[])).await.expect("order");

    assert_ne!(first.customer.id, second.customer.id);
}

#[tokio::test]
#[serial]
#[ignore = "requires a PostgreSQL database at DATABASE_URL"]
async fn test_placement_without_managers_persists_nothing() {
    let pool = fresh_pool().await;
    let orders = OrderRepository::new(pool.clone());
    let keyboard = product(&pool, "Keyboard", 40.0).await;

    let result = orders.place(&order_for(ada(), &[(keyboard, 1)])).await;

    assert!(matches!(result, Err(WorkflowError::NoManagers)));
    assert_eq!(count(&pool, "orders").await, 0);
    assert_eq!(count(&pool, "customers").await, 0);
}

#[tokio::test]
#[serial]
#[ignore = "requires a PostgreSQL database at DATABASE_URL"]
async fn test_item_prices_are_snapshots() {
    let pool = fresh_pool().await;
    let orders = OrderRepository::new(pool.clone());
    manager(&pool, "m1@example.com").await;
    let keyboard = product(&pool, "Keyboard", 40.0).await;

    let placed = orders
        .place(&order_for(ada(), &[(keyboard, 3), (keyboard, 1)]))
        .await
        .expect("order");
    assert_eq!(placed.items.len(), 1);
    assert_eq!(placed.items[0].quantity, 1);

    sqlx::query("UPDATE products SET price = 99.0 WHERE id = $1")
        .bind(keyboard)
        .execute(&pool)
        .await
        .expect("reprice");

    let reloaded = orders.find(placed.id).await.expect("find").expect("order");
    assert_eq!(reloaded.items[0].price, 40.0);
    assert_eq!(reloaded, placed);
}

#[tokio::test]
#[serial]
#[ignore = "requires a PostgreSQL database at DATABASE_URL"]
async fn test_returns_cannot_exceed_ordered_quantity() {
    let pool = fresh_pool().await;
    let orders = OrderRepository::new(pool.clone());
    let returns = ReturnRepository::new(pool.clone());
    manager(&pool, "m1@example.com").await;
    let keyboard = product(&pool, "Keyboard", 40.0).await;
    let mouse = product(&pool, "Mouse", 15.5).await;

    let order = orders
        .place(&order_for(ada(), &[(keyboard, 2)]))
        .await
        .expect("order");

    let request = |order_id, product_id, quantity| NewReturn {
        order_id,
        product_id,
        quantity,
        reason: Some("Faulty".to_string()),
    };

    let too_many = returns.create(&request(order.id, keyboard, 3)).await;
    assert!(matches!(too_many, Err(WorkflowError::Invalid(_))));
    assert_eq!(count(&pool, "returns").await, 0);

    let unknown_order = returns.create(&request(order.id + 1000, keyboard, 1)).await;
    assert!(matches!(unknown_order, Err(WorkflowError::NotFound(msg)) if msg == "Unknown order"));

    let unknown_item = returns.create(&request(order.id, mouse, 1)).await;
    assert!(matches!(unknown_item, Err(WorkflowError::NotFound(msg)) if msg == "Unknown item"));

    let created = returns
        .create(&request(order.id, keyboard, 2))
        .await
        .expect("return");
    assert_eq!(created.quantity, 2);
    assert_eq!(created.item.id, keyboard);
    assert_eq!(created.customer, order.customer);

    let again = returns.create(&request(order.id, keyboard, 1)).await;
    assert!(matches!(again, Err(WorkflowError::Invalid(_))));
    assert_eq!(count(&pool, "returns").await, 1);
}
