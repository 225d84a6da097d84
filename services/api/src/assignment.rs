//! Least-loaded manager selection

use common::error::DatabaseResult;
use sqlx::PgConnection;

/// Pick the manager owning the fewest orders, if any manager exists.
///
/// Managers without orders count as zero. Equal loads resolve to the
/// lowest manager id. The count is a snapshot; concurrent placements may
/// choose the same manager.
pub async fn least_loaded_manager(conn: &mut PgConnection) -> DatabaseResult<Option<i64>> {
    let manager_id = sqlx::query_scalar(
        r#"
        SELECT m.id
        FROM managers m
        LEFT JOIN orders o ON o.manager_id = m.id
        GROUP BY m.id
        ORDER BY COUNT(o.id) ASC, m.id ASC
        LIMIT 1
        "#,
    )
    .fetch_optional(conn)
    .await?;

    Ok(manager_id)
}
