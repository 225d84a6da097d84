//! Manager and session entities shared by the services

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::permissions::Permissions;

/// Manager entity
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Manager {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Argon2 PHC string
    #[serde(skip_serializing)]
    pub password: String,
    pub permissions: Permissions,
}

/// New manager creation payload
#[derive(Debug, Clone, Deserialize)]
pub struct NewManager {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub permissions: Permissions,
}

/// Session entity
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Session {
    pub id: i64,
    pub manager_id: i64,
    #[serde(skip_serializing)]
    pub token: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// The principal resolved for an authenticated request
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub manager: Manager,
    pub session: Session,
}

impl AuthContext {
    /// Shorthand for the manager's permission check
    pub fn can(&self, required: Permissions) -> bool {
        self.manager.permissions.check(required)
    }
}
