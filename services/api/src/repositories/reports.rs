//! Per-entity reports

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, Utc};
use common::error::DatabaseResult;
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use crate::{
    composition::{CustomerView, OrderView},
    models::{Customer, catalog::Product},
    repositories::orders::OrderRepository,
};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProductReport {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub product: Product,
    pub category_name: Option<String>,
    pub order_count: i64,
    pub order_item_count: i64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CategoryReport {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub product_count: i64,
    pub order_count: i64,
    pub product_quantity: i64,
    pub product_average_price: f64,
}

/// An order with the sum of its line totals
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportedOrder {
    #[serde(flatten)]
    pub order: OrderView,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerReport {
    #[serde(flatten)]
    pub customer: CustomerView,
    pub order_count: usize,
    pub orders: Vec<ReportedOrder>,
    pub total: f64,
    /// Mean order total per `M.YYYY` month, for orders placed in the
    /// year before the report was built
    pub averages: BTreeMap<String, f64>,
}

/// Sum of `price * quantity` over an order's items
pub fn order_total(order: &OrderView) -> f64 {
    order
        .items
        .iter()
        .map(|item| item.price * f64::from(item.quantity))
        .sum()
}

/// Build a customer report from the customer's composed orders
pub fn build_customer_report(
    customer: Customer,
    orders: Vec<OrderView>,
    now: DateTime<Utc>,
) -> CustomerReport {
    let cutoff = now - Duration::days(365);
    let mut monthly: BTreeMap<String, (f64, u32)> = BTreeMap::new();

    let orders: Vec<ReportedOrder> = orders
        .into_iter()
        .map(|order| {
            let total = order_total(&order);
            if order.creation_time > cutoff {
                let key = format!(
                    "{}.{}",
                    order.creation_time.month(),
                    order.creation_time.year()
                );
                let entry = monthly.entry(key).or_insert((0.0, 0));
                entry.0 += total;
                entry.1 += 1;
            }
            ReportedOrder { order, total }
        })
        .collect();

    CustomerReport {
        customer: customer.into(),
        order_count: orders.len(),
        total: orders.iter().map(|o| o.total).sum(),
        averages: monthly
            .into_iter()
            .map(|(month, (sum, count))| (month, sum / f64::from(count)))
            .collect(),
        orders,
    }
}

/// Report repository for database operations
#[derive(Clone)]
pub struct ReportRepository {
    pool: PgPool,
    orders: OrderRepository,
}

impl ReportRepository {
    /// Create a new report repository
    pub fn new(pool: PgPool) -> Self {
        Self {
            orders: OrderRepository::new(pool.clone()),
            pool,
        }
    }

    pub async fn product(&self, product_id: i64) -> DatabaseResult<Option<ProductReport>> {
        let report = sqlx::query_as(
            r#"
            SELECT p.id, p.model, p.manufacturer, p.price, p.quantity, p.per_order_limit,
                   p.image_url, p.warranty_days, p.category_id,
                   cat.name AS category_name,
                   (SELECT COUNT(DISTINCT oi.order_id)
                      FROM order_items oi WHERE oi.product_id = p.id) AS order_count,
                   (SELECT COALESCE(SUM(oi.quantity), 0)::BIGINT
                      FROM order_items oi WHERE oi.product_id = p.id) AS order_item_count
            FROM products p
            LEFT JOIN categories cat ON cat.id = p.category_id
            WHERE p.id = $1
            "#,
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(report)
    }

    pub async fn customer(&self, customer_id: i64) -> DatabaseResult<Option<CustomerReport>> {
        let customer: Option<Customer> = sqlx::query_as(
            "SELECT id, first_name, last_name, email, phone_number FROM customers WHERE id = $1",
        )
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(customer) = customer else {
            return Ok(None);
        };

        let ids = self.orders.ids_for_customer(customer_id).await?;
        let orders = self.orders.load_views(&ids).await?;

        Ok(Some(build_customer_report(customer, orders, Utc::now())))
    }

    pub async fn category(&self, category_id: i64) -> DatabaseResult<Option<CategoryReport>> {
        let report = sqlx::query_as(
            r#"
            SELECT cat.id, cat.name, cat.description,
                   (SELECT COUNT(*) FROM products p WHERE p.category_id = cat.id) AS product_count,
                   (SELECT COUNT(DISTINCT oi.order_id)
                      FROM order_items oi JOIN products p ON p.id = oi.product_id
                     WHERE p.category_id = cat.id) AS order_count,
                   (SELECT COALESCE(SUM(p.quantity), 0)::BIGINT
                      FROM products p WHERE p.category_id = cat.id) AS product_quantity,
                   (SELECT COALESCE(AVG(p.price), 0)::DOUBLE PRECISION
                      FROM products p WHERE p.category_id = cat.id) AS product_average_price
            FROM categories cat
            WHERE cat.id = $1
            "#,
        )
        .bind(category_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(report)
    }
}
