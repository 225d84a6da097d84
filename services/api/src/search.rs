//! Allow-listed filter, sort and pagination over searchable entities

pub mod plan;
pub mod request;
pub mod schema;

use serde::Serialize;

pub use plan::SearchPlan;
pub use request::SearchRequest;

/// `{results, count}` envelope returned by every search endpoint
#[derive(Debug, Clone, Serialize)]
pub struct SearchResults<T> {
    pub results: Vec<T>,
    pub count: i64,
}
