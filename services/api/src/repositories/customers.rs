//! Customer lookup for order placement

use common::error::DatabaseResult;
use sqlx::PgConnection;
use tracing::debug;

use crate::models::CustomerInfo;

/// Return the id of the customer matching all four identity fields,
/// creating one when none matches.
///
/// Nothing serializes concurrent calls with the same tuple, so two
/// simultaneous first orders may create two customers.
pub async fn find_or_create(conn: &mut PgConnection, info: &CustomerInfo) -> DatabaseResult<i64> {
    let existing: Option<i64> = sqlx::query_scalar(
        r#"
        SELECT id FROM customers
        WHERE first_name = $1 AND last_name = $2 AND email = $3 AND phone_number = $4
        ORDER BY id
        LIMIT 1
        "#,
    )
    .bind(&info.first_name)
    .bind(&info.last_name)
    .bind(&info.email)
    .bind(info.phone_number)
    .fetch_optional(&mut *conn)
    .await?;

    if let Some(id) = existing {
        return Ok(id);
    }

    let id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO customers (first_name, last_name, email, phone_number)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        "#,
    )
    .bind(&info.first_name)
    .bind(&info.last_name)
    .bind(&info.email)
    .bind(info.phone_number)
    .fetch_one(&mut *conn)
    .await?;

    debug!(customer_id = id, "Created customer");
    Ok(id)
}
