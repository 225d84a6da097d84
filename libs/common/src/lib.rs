//! Common library for the storefront services
//!
//! This crate provides functionality shared by the auth and API services:
//! database connectivity and migrations, the permission model, manager and
//! session storage, password hashing, configuration and logging setup.
//!
//! ```rust,no_run
//! use storefront_common::database::{DatabaseConfig, health_check, init_pool, run_migrations};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig::from_env()?;
//!     let pool = init_pool(&config).await?;
//!     run_migrations(&pool).await?;
//!     let is_healthy = health_check(&pool).await?;
//!     println!("Database health check: {}", is_healthy);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod database;
pub mod error;
pub mod managers;
pub mod models;
pub mod password;
pub mod permissions;
pub mod session;
pub mod telemetry;

pub use models::{AuthContext, Manager, NewManager, Session};
pub use permissions::Permissions;
