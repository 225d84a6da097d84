//! Returns of ordered items

use common::error::{DatabaseError, DatabaseResult};
use sqlx::{PgPool, Row};
use tracing::info;

use crate::{
    composition::{ReturnView, compose_returns},
    models::returns::{NewReturn, ReturnParts, ReturnRecord, ReturnUpdate},
    repositories::{CUSTOMER_COLUMNS, LINE_COLUMNS, customer_from_row, line_from_row},
    workflow::WorkflowError,
};

/// Return repository for database operations
#[derive(Clone)]
pub struct ReturnRepository {
    pool: PgPool,
}

/// Check a return quantity against the quantity that was ordered
pub fn check_return_quantity(requested: i32, ordered: i32) -> Result<(), WorkflowError> {
    if requested < 1 {
        return Err(WorkflowError::Invalid(
            "Return quantity must be at least 1".to_string(),
        ));
    }
    if requested > ordered {
        return Err(WorkflowError::Invalid(
            "Return quantity cannot be bigger than order quantity".to_string(),
        ));
    }
    Ok(())
}

impl ReturnRepository {
    /// Create a new return repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Register a return of `product_id` from `order_id`
    pub async fn create(&self, request: &NewReturn) -> Result<ReturnView, WorkflowError> {
        let mut tx = self.pool.begin().await?;

        let order: Option<i64> = sqlx::query_scalar("SELECT id FROM orders WHERE id = $1")
            .bind(request.order_id)
            .fetch_optional(&mut *tx)
            .await?;
        if order.is_none() {
            return Err(WorkflowError::NotFound("Unknown order".to_string()));
        }

        let item: Option<(i64, i32)> = sqlx::query_as(
            r#"
            SELECT id, quantity FROM order_items
            WHERE order_id = $1 AND product_id = $2
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(request.order_id)
        .bind(request.product_id)
        .fetch_optional(&mut *tx)
        .await?;
        let (item_id, ordered) =
            item.ok_or_else(|| WorkflowError::NotFound("Unknown item".to_string()))?;

        check_return_quantity(request.quantity, ordered)?;

        let inserted = sqlx::query_scalar(
            r#"
            INSERT INTO returns (status, creation_time, quantity, reason, order_id, order_item_id)
            VALUES ('processing', NOW(), $1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(request.quantity)
        .bind(&request.reason)
        .bind(request.order_id)
        .bind(item_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(DatabaseError::from);

        let return_id: i64 = match inserted {
            Ok(id) => id,
            Err(e) if e.is_unique_violation() => {
                return Err(WorkflowError::Invalid(
                    "This item has already been returned".to_string(),
                ));
            }
            Err(e) => return Err(e.into()),
        };

        tx.commit().await?;
        info!(return_id, order_id = request.order_id, "Registered return");

        self.find(return_id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound("Unknown return".to_string()))
    }

    /// Apply the present fields of `update`, re-checking the quantity
    pub async fn update(&self, id: i64, update: &ReturnUpdate) -> Result<ReturnView, WorkflowError> {
        let ordered: Option<i32> = sqlx::query_scalar(
            r#"
            SELECT oi.quantity
            FROM returns r
            JOIN order_items oi ON oi.id = r.order_item_id
            WHERE r.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        let ordered = ordered.ok_or_else(|| WorkflowError::NotFound("Unknown return".to_string()))?;

        if let Some(quantity) = update.quantity {
            check_return_quantity(quantity, ordered)?;
        }

        sqlx::query(
            r#"
            UPDATE returns
            SET quantity = COALESCE($2, quantity),
                reason = COALESCE($3, reason),
                status = COALESCE($4, status)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(update.quantity)
        .bind(&update.reason)
        .bind(&update.status)
        .execute(&self.pool)
        .await?;

        self.find(id)
            .await?
            .ok_or_else(|| WorkflowError::NotFound("Unknown return".to_string()))
    }

    /// Composed views for `ids`, in the same order; unknown ids are skipped
    pub async fn load_views(&self, ids: &[i64]) -> DatabaseResult<Vec<ReturnView>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(&format!(
            r#"
            SELECT r.id AS return_id, r.status AS return_status,
                   r.creation_time AS return_creation_time, r.quantity AS return_quantity,
                   r.reason, r.order_id AS return_order_id, r.order_item_id,
                   {}, {}
            FROM returns r
            JOIN orders o ON o.id = r.order_id
            JOIN customers c ON c.id = o.customer_id
            JOIN order_items oi ON oi.id = r.order_item_id
            JOIN products p ON p.id = oi.product_id
            WHERE r.id = ANY($1)
            "#,
            CUSTOMER_COLUMNS, LINE_COLUMNS
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        let parts = rows
            .iter()
            .map(|row| {
                let (item, product) = line_from_row(row);
                ReturnParts {
                    record: ReturnRecord {
                        id: row.get("return_id"),
                        status: row.get("return_status"),
                        creation_time: row.get("return_creation_time"),
                        quantity: row.get("return_quantity"),
                        reason: row.get("reason"),
                        order_id: row.get("return_order_id"),
                        order_item_id: row.get("order_item_id"),
                    },
                    customer: customer_from_row(row),
                    item,
                    product,
                }
            })
            .collect();

        Ok(compose_returns(ids, parts))
    }

    /// Composed view of one return
    pub async fn find(&self, id: i64) -> DatabaseResult<Option<ReturnView>> {
        Ok(self.load_views(&[id]).await?.pop())
    }
}
