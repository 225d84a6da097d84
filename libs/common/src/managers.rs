//! Manager repository for database operations

use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::info;

use crate::{
    error::DatabaseResult,
    models::{Manager, NewManager},
    permissions::Permissions,
};

const MANAGER_COLUMNS: &str = "id, first_name, last_name, email, password, permissions";

/// Manager repository
#[derive(Clone)]
pub struct ManagerRepository {
    pool: PgPool,
}

fn manager_from_row(row: &PgRow) -> Manager {
    Manager {
        id: row.get("id"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        email: row.get("email"),
        password: row.get("password"),
        permissions: row.get("permissions"),
    }
}

impl ManagerRepository {
    /// Create a new manager repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new manager. `password_hash` must already be hashed.
    pub async fn create(&self, new_manager: &NewManager, password_hash: &str) -> DatabaseResult<Manager> {
        info!("Creating new manager: {}", new_manager.email);

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO managers (first_name, last_name, email, password, permissions)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {MANAGER_COLUMNS}
            "#
        ))
        .bind(&new_manager.first_name)
        .bind(&new_manager.last_name)
        .bind(&new_manager.email)
        .bind(password_hash)
        .bind(new_manager.permissions)
        .fetch_one(&self.pool)
        .await?;

        Ok(manager_from_row(&row))
    }

    /// Find a manager by email
    pub async fn find_by_email(&self, email: &str) -> DatabaseResult<Option<Manager>> {
        let row = sqlx::query(&format!(
            "SELECT {MANAGER_COLUMNS} FROM managers WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(manager_from_row))
    }

    /// Replace a manager's permission bitmask
    pub async fn update_permissions(
        &self,
        id: i64,
        permissions: Permissions,
    ) -> DatabaseResult<Option<Manager>> {
        info!(manager_id = id, permissions = permissions.bits(), "Updating permissions");

        let row = sqlx::query(&format!(
            "UPDATE managers SET permissions = $2 WHERE id = $1 RETURNING {MANAGER_COLUMNS}"
        ))
        .bind(id)
        .bind(permissions)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(manager_from_row))
    }

    /// Replace a manager's password hash
    pub async fn update_password(&self, id: i64, password_hash: &str) -> DatabaseResult<bool> {
        let result = sqlx::query("UPDATE managers SET password = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Count all managers
    pub async fn count(&self) -> DatabaseResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM managers")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
