//! Session credentials and the session store
//!
//! A session is surfaced to clients as the composite credential
//! `session_id.manager_id.token`. Every way a credential can fail, whether it
//! is malformed, unknown, expired or mismatched, is reported the same way:
//! no session.

use chrono::{Duration, Utc};
use sqlx::{PgPool, Row};
use std::{fmt, str::FromStr};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    error::DatabaseResult,
    models::{AuthContext, Manager, Session},
};

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Session lifetime in seconds
    pub ttl_seconds: i64,
}

impl SessionConfig {
    /// Create a new SessionConfig from environment variables
    ///
    /// # Environment Variables
    /// - `SESSION_TTL_SECONDS`: Session lifetime in seconds (default: 2592000, 30 days)
    pub fn from_env() -> Self {
        let ttl_seconds = std::env::var("SESSION_TTL_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|ttl: &i64| *ttl > 0)
            .unwrap_or(2_592_000);

        Self { ttl_seconds }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: 2_592_000,
        }
    }
}

/// The parsed form of a `session_id.manager_id.token` credential
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionCredential {
    pub session_id: i64,
    pub manager_id: i64,
    pub token: Uuid,
}

/// A credential string that does not have the expected shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MalformedCredential;

impl FromStr for SessionCredential {
    type Err = MalformedCredential;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('.');
        let (Some(session_id), Some(manager_id), Some(token), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(MalformedCredential);
        };

        Ok(Self {
            session_id: session_id.parse().map_err(|_| MalformedCredential)?,
            manager_id: manager_id.parse().map_err(|_| MalformedCredential)?,
            token: Uuid::parse_str(token).map_err(|_| MalformedCredential)?,
        })
    }
}

impl fmt::Display for SessionCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.session_id, self.manager_id, self.token)
    }
}

/// Session repository
#[derive(Clone)]
pub struct SessionRepository {
    pool: PgPool,
    ttl: Duration,
}

impl SessionRepository {
    /// Create a new session repository
    pub fn new(pool: PgPool, config: &SessionConfig) -> Self {
        Self {
            pool,
            ttl: Duration::seconds(config.ttl_seconds),
        }
    }

    /// Resolve a raw credential string to its live session and manager.
    ///
    /// Returns `Ok(None)` for malformed credentials as well as for unknown or
    /// expired sessions.
    pub async fn authenticate(&self, credential: &str) -> DatabaseResult<Option<AuthContext>> {
        let Ok(credential) = credential.parse::<SessionCredential>() else {
            debug!("Rejecting malformed session credential");
            return Ok(None);
        };

        let row = sqlx::query(
            r#"
            SELECT s.id AS session_id, s.manager_id, s.token, s.created_at, s.expires_at,
                   m.first_name, m.last_name, m.email, m.password, m.permissions
            FROM sessions s
            JOIN managers m ON m.id = s.manager_id
            WHERE s.id = $1 AND s.manager_id = $2 AND s.token = $3 AND s.expires_at > NOW()
            "#,
        )
        .bind(credential.session_id)
        .bind(credential.manager_id)
        .bind(credential.token)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            debug!(session_id = credential.session_id, "No live session matched");
            return Ok(None);
        };

        let session = Session {
            id: row.get("session_id"),
            manager_id: row.get("manager_id"),
            token: row.get("token"),
            created_at: row.get("created_at"),
            expires_at: row.get("expires_at"),
        };
        let manager = Manager {
            id: session.manager_id,
            first_name: row.get("first_name"),
            last_name: row.get("last_name"),
            email: row.get("email"),
            password: row.get("password"),
            permissions: row.get("permissions"),
        };

        Ok(Some(AuthContext { manager, session }))
    }

    /// Open a new session for a manager and return its credential
    pub async fn create(&self, manager_id: i64) -> DatabaseResult<SessionCredential> {
        let token = Uuid::new_v4();
        let expires_at = Utc::now() + self.ttl;

        let session_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO sessions (manager_id, token, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(manager_id)
        .bind(token)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;

        info!(session_id, manager_id, "Session created");

        Ok(SessionCredential {
            session_id,
            manager_id,
            token,
        })
    }

    /// Delete one session by ID
    pub async fn delete(&self, session_id: i64) -> DatabaseResult<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete every session of a manager except the one given
    pub async fn delete_others(&self, manager_id: i64, keep_session_id: i64) -> DatabaseResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE manager_id = $1 AND id <> $2")
            .bind(manager_id)
            .bind(keep_session_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Cleanup expired sessions
    pub async fn purge_expired(&self) -> DatabaseResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await?;

        info!("Purged {} expired sessions", result.rows_affected());
        Ok(result.rows_affected())
    }
}
