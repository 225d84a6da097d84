//! Manager authentication service
//!
//! Issues and revokes session credentials and lets administrators manage
//! manager accounts and their permissions.

pub mod bootstrap;
pub mod error;
pub mod middleware;
pub mod rate_limiter;
pub mod routes;
pub mod validation;

use common::{managers::ManagerRepository, session::SessionRepository};
use sqlx::PgPool;

pub use routes::create_router;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub manager_repository: ManagerRepository,
    pub session_repository: SessionRepository,
    pub rate_limiter: rate_limiter::RateLimiter,
}

impl AppState {
    pub fn new(db_pool: PgPool, session_config: &common::session::SessionConfig) -> Self {
        Self {
            manager_repository: ManagerRepository::new(db_pool.clone()),
            session_repository: SessionRepository::new(db_pool, session_config),
            rate_limiter: rate_limiter::RateLimiter::new(
                rate_limiter::RateLimiterConfig::from_env(),
            ),
        }
    }
}
