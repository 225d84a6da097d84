//! Storefront API service
//!
//! Search over the catalog and sales entities, order placement, returns,
//! statistics, reports and a read-only SQL console. Every route except
//! `/health` requires a session issued by the authentication service.

pub mod assignment;
pub mod composition;
pub mod error;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod search;
pub mod state;
pub mod workflow;

pub use routes::create_router;
pub use state::AppState;
