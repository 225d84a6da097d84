//! Database fixtures shared by the integration tests.
#![allow(dead_code)]

use api::models::{
    CustomerInfo,
    orders::{NewOrder, RequestedProduct},
};
use common::{
    NewManager, Permissions,
    database::{DatabaseConfig, init_pool, run_migrations},
    managers::ManagerRepository,
};
use sqlx::PgPool;

/// Pool over a freshly migrated, emptied schema
pub async fn fresh_pool() -> PgPool {
    let config = DatabaseConfig::from_env().expect("database config");
    let pool = init_pool(&config).await.expect("database pool");
    run_migrations(&pool).await.expect("migrations");

    sqlx::query(
        "TRUNCATE returns, order_items, orders, customers, sessions, managers, \
         product_characteristics, products, characteristics, categories RESTART IDENTITY CASCADE",
    )
    .execute(&pool)
    .await
    .expect("truncate");

    pool
}

pub async fn manager(pool: &PgPool, email: &str) -> i64 {
    ManagerRepository::new(pool.clone())
        .create(
            &NewManager {
                first_name: "Test".to_string(),
                last_name: "Manager".to_string(),
                email: email.to_string(),
                password: String::new(),
                permissions: Permissions::DEFAULT,
            },
            "unused-hash",
        )
        .await
        .expect("manager")
        .id
}

pub async fn product(pool: &PgPool, model: &str, price: f64) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO products (model, manufacturer, price, quantity) VALUES ($1, 'Acme', $2, 100) RETURNING id",
    )
    .bind(model)
    .bind(price)
    .fetch_one(pool)
    .await
    .expect("product")
}

pub fn ada() -> CustomerInfo {
    CustomerInfo {
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        email: "ada@example.com".to_string(),
        phone_number: 380501234567,
    }
}

pub fn order_for(customer: CustomerInfo, products: &[(i64, i32)]) -> NewOrder {
    NewOrder {
        customer_info: customer,
        products: products
            .iter()
            .map(|&(id, quantity)| RequestedProduct { id, quantity })
            .collect(),
        address: "1 Main St".to_string(),
        order_type: "delivery".to_string(),
    }
}

pub async fn count(pool: &PgPool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await
        .expect("count")
}
