//! Aggregate statistics over orders and returns
//!
//! Every aggregate is computed in its own subquery so that joining orders,
//! items and returns never multiplies rows.

use common::error::DatabaseResult;
use serde::Serialize;
use sqlx::{FromRow, PgPool};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CustomerStatistics {
    pub order_count: i64,
    pub return_count: i64,
    pub ordered_product_count: i64,
    pub ordered_item_count: i64,
    pub returned_item_count: i64,
    pub total_money: f64,
    /// Mean order total over orders that have items
    pub avg_money: f64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CategoryStatistics {
    pub order_count: i64,
    pub return_count: i64,
    pub ordered_item_count: i64,
    pub returned_item_count: i64,
    pub total_money: f64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TopCustomer {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: i64,
    pub order_items: i64,
    pub money_spent: f64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct MonthlyTotals {
    pub month: i32,
    pub order_count: i64,
    pub total_money: f64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DailyTotals {
    pub day: i32,
    pub order_count: i64,
    pub total_money: f64,
}

/// Statistics repository for database operations
#[derive(Clone)]
pub struct StatisticsRepository {
    pool: PgPool,
}

impl StatisticsRepository {
    /// Create a new statistics repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// `None` when the customer does not exist
    pub async fn customer(&self, customer_id: i64) -> DatabaseResult<Option<CustomerStatistics>> {
        let stats = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM orders o WHERE o.customer_id = c.id) AS order_count,
                (SELECT COUNT(*)
                   FROM returns r JOIN orders o ON o.id = r.order_id
                  WHERE o.customer_id = c.id) AS return_count,
                (SELECT COUNT(DISTINCT oi.product_id)
                   FROM order_items oi JOIN orders o ON o.id = oi.order_id
                  WHERE o.customer_id = c.id) AS ordered_product_count,
                (SELECT COALESCE(SUM(oi.quantity), 0)::BIGINT
                   FROM order_items oi JOIN orders o ON o.id = oi.order_id
                  WHERE o.customer_id = c.id) AS ordered_item_count,
                (SELECT COALESCE(SUM(r.quantity), 0)::BIGINT
                   FROM returns r JOIN orders o ON o.id = r.order_id
                  WHERE o.customer_id = c.id) AS returned_item_count,
                (SELECT COALESCE(SUM(oi.price * oi.quantity), 0)::DOUBLE PRECISION
                   FROM order_items oi JOIN orders o ON o.id = oi.order_id
                  WHERE o.customer_id = c.id) AS total_money,
                (SELECT COALESCE(AVG(t.total), 0)::DOUBLE PRECISION
                   FROM (SELECT SUM(oi.price * oi.quantity) AS total
                           FROM order_items oi JOIN orders o ON o.id = oi.order_id
                          WHERE o.customer_id = c.id
                          GROUP BY oi.order_id) t) AS avg_money
            FROM customers c
            WHERE c.id = $1
            "#,
        )
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(stats)
    }

    /// `None` when the category does not exist
    pub async fn category(&self, category_id: i64) -> DatabaseResult<Option<CategoryStatistics>> {
        let stats = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(DISTINCT oi.order_id)
                   FROM order_items oi JOIN products p ON p.id = oi.product_id
                  WHERE p.category_id = cat.id) AS order_count,
                (SELECT COUNT(*)
                   FROM returns r
                   JOIN order_items oi ON oi.id = r.order_item_id
                   JOIN products p ON p.id = oi.product_id
                  WHERE p.category_id = cat.id) AS return_count,
                (SELECT COALESCE(SUM(oi.quantity), 0)::BIGINT
                   FROM order_items oi JOIN products p ON p.id = oi.product_id
                  WHERE p.category_id = cat.id) AS ordered_item_count,
                (SELECT COALESCE(SUM(r.quantity), 0)::BIGINT
                   FROM returns r
                   JOIN order_items oi ON oi.id = r.order_item_id
                   JOIN products p ON p.id = oi.product_id
                  WHERE p.category_id = cat.id) AS returned_item_count,
                (SELECT COALESCE(SUM(oi.price * oi.quantity), 0)::DOUBLE PRECISION
                   FROM order_items oi JOIN products p ON p.id = oi.product_id
                  WHERE p.category_id = cat.id) AS total_money
            FROM categories cat
            WHERE cat.id = $1
            "#,
        )
        .bind(category_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(stats)
    }

    /// Customers ranked by money spent over the last year
    pub async fn top_customers(&self, count: i64) -> DatabaseResult<Vec<TopCustomer>> {
        let customers = sqlx::query_as(
            r#"
            SELECT c.id, c.first_name, c.last_name, c.email, c.phone_number,
                   COUNT(oi.id) AS order_items,
                   SUM(oi.price * oi.quantity)::DOUBLE PRECISION AS money_spent
            FROM customers c
            JOIN orders o ON o.customer_id = c.id
            JOIN order_items oi ON oi.order_id = o.id
            WHERE o.creation_time > NOW() - INTERVAL '1 year'
            GROUP BY c.id
            ORDER BY money_spent DESC, order_items DESC, c.id ASC
            LIMIT $1
            "#,
        )
        .bind(count)
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Order count and money per calendar month over the last year
    pub async fn last_year(&self) -> DatabaseResult<Vec<MonthlyTotals>> {
        let totals = sqlx::query_as(
            r#"
            SELECT EXTRACT(MONTH FROM o.creation_time)::INT AS month,
                   COUNT(DISTINCT o.id) AS order_count,
                   COALESCE(SUM(oi.price * oi.quantity), 0)::DOUBLE PRECISION AS total_money
            FROM orders o
            JOIN order_items oi ON oi.order_id = o.id
            WHERE o.creation_time > NOW() - INTERVAL '1 year'
            GROUP BY 1
            ORDER BY 1
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(totals)
    }

    /// Order count and money per day of month over the last month
    pub async fn last_month(&self) -> DatabaseResult<Vec<DailyTotals>> {
        let totals = sqlx::query_as(
            r#"
            SELECT EXTRACT(DAY FROM o.creation_time)::INT AS day,
                   COUNT(DISTINCT o.id) AS order_count,
                   COALESCE(SUM(oi.price * oi.quantity), 0)::DOUBLE PRECISION AS total_money
            FROM orders o
            JOIN order_items oi ON oi.order_id = o.id
            WHERE o.creation_time > NOW() - INTERVAL '1 month'
            GROUP BY 1
            ORDER BY 1
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(totals)
    }
}
