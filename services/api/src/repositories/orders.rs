//! Order placement and order reads

use common::error::DatabaseResult;
use sqlx::{PgPool, Row};
use tracing::info;

use crate::{
    assignment::least_loaded_manager,
    composition::{OrderView, compose_orders},
    models::orders::{INITIAL_ORDER_STATUS, NewOrder, OrderHeader, OrderUpdate},
    repositories::{CUSTOMER_COLUMNS, LINE_COLUMNS, customer_from_row, customers, line_from_row},
    search::SearchResults,
    workflow::{WorkflowError, materialize_items, requested_ids, validate_quantities},
};

/// Order repository for database operations
#[derive(Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    /// Create a new order repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Place an order.
    ///
    /// Customer resolution, manager assignment, the header and its items
    /// are written in one transaction; any failure leaves nothing behind.
    pub async fn place(&self, order: &NewOrder) -> Result<OrderView, WorkflowError> {
        validate_quantities(&order.products)?;

        let mut tx = self.pool.begin().await?;

        let customer_id = customers::find_or_create(&mut tx, &order.customer_info).await?;

        let manager_id = least_loaded_manager(&mut tx)
            .await?
            .ok_or(WorkflowError::NoManagers)?;

        let order_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO orders (status, creation_time, address, order_type, customer_id, manager_id)
            VALUES ($1, NOW(), $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(INITIAL_ORDER_STATUS)
        .bind(&order.address)
        .bind(&order.order_type)
        .bind(customer_id)
        .bind(manager_id)
        .fetch_one(&mut *tx)
        .await?;

        let catalog: Vec<(i64, f64)> =
            sqlx::query_as("SELECT id, price FROM products WHERE id = ANY($1) ORDER BY id")
                .bind(requested_ids(&order.products))
                .fetch_all(&mut *tx)
                .await?;

        let items = materialize_items(&order.products, &catalog);
        if !items.is_empty() {
            let product_ids: Vec<i64> = items.iter().map(|i| i.product_id).collect();
            let quantities: Vec<i32> = items.iter().map(|i| i.quantity).collect();
            let prices: Vec<f64> = items.iter().map(|i| i.price).collect();

            sqlx::query(
                r#"
                INSERT INTO order_items (order_id, product_id, quantity, price)
                SELECT $1, item.product_id, item.quantity, item.price
                FROM UNNEST($2::BIGINT[], $3::INT[], $4::DOUBLE PRECISION[])
                    AS item (product_id, quantity, price)
                "#,
            )
            .bind(order_id)
            .bind(product_ids)
            .bind(quantities)
            .bind(prices)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            order_id,
            customer_id,
            manager_id,
            items = items.len(),
            "Placed order"
        );

        self.find(order_id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound("Unknown order".to_string()))
    }

    /// Composed views for `ids`, in the same order; unknown ids are skipped
    pub async fn load_views(&self, ids: &[i64]) -> DatabaseResult<Vec<OrderView>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let header_rows = sqlx::query(&format!(
            r#"
            SELECT o.id, o.status, o.creation_time, o.address, o.order_type, o.manager_id,
                   {}
            FROM orders o
            JOIN customers c ON c.id = o.customer_id
            WHERE o.id = ANY($1)
            "#,
            CUSTOMER_COLUMNS
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        let headers = header_rows
            .iter()
            .map(|row| OrderHeader {
                id: row.get("id"),
                status: row.get("status"),
                creation_time: row.get("creation_time"),
                address: row.get("address"),
                order_type: row.get("order_type"),
                manager_id: row.get("manager_id"),
                customer: customer_from_row(row),
            })
            .collect();

        let line_rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM order_items oi
            JOIN products p ON p.id = oi.product_id
            WHERE oi.order_id = ANY($1)
            ORDER BY oi.id
            "#,
            LINE_COLUMNS
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        let lines = line_rows.iter().map(line_from_row).collect();

        Ok(compose_orders(ids, headers, lines))
    }

    /// Composed view of one order
    pub async fn find(&self, id: i64) -> DatabaseResult<Option<OrderView>> {
        Ok(self.load_views(&[id]).await?.pop())
    }

    /// Orders by ascending id, `limit` per zero-based `page`
    pub async fn list(&self, page: i64, limit: i64) -> DatabaseResult<SearchResults<OrderView>> {
        let ids: Vec<i64> = sqlx::query_scalar("SELECT id FROM orders ORDER BY id LIMIT $1 OFFSET $2")
            .bind(limit)
            .bind(page.saturating_mul(limit))
            .fetch_all(&self.pool)
            .await?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(SearchResults {
            results: self.load_views(&ids).await?,
            count,
        })
    }

    /// Apply the present fields of `update`; items are never touched
    pub async fn update(&self, id: i64, update: &OrderUpdate) -> DatabaseResult<Option<OrderView>> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = COALESCE($2, status),
                address = COALESCE($3, address),
                order_type = COALESCE($4, order_type)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&update.status)
        .bind(&update.address)
        .bind(&update.order_type)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.find(id).await
    }

    /// Ids of a customer's orders, oldest first
    pub async fn ids_for_customer(&self, customer_id: i64) -> DatabaseResult<Vec<i64>> {
        let ids = sqlx::query_scalar("SELECT id FROM orders WHERE customer_id = $1 ORDER BY id")
            .bind(customer_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }
}
