//! API service routes

mod orders;
mod reports;
mod returns;
mod search;
mod sql;
mod statistics;

use axum::{
    Json, Router, middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;

use crate::{middleware::auth_middleware, state::AppState};

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/api/v0/categories/search", post(search::categories))
        .route("/api/v0/characteristics/search", post(search::characteristics))
        .route("/api/v0/products/search", post(search::products))
        .route("/api/v0/customers/search", post(search::customers))
        .route("/api/v0/managers/search", post(search::managers))
        .route("/api/v0/orders", get(orders::list).post(orders::create))
        .route("/api/v0/orders/search", post(orders::search))
        .route("/api/v0/orders/:id", get(orders::get).patch(orders::update))
        .route("/api/v0/returns", post(returns::create))
        .route("/api/v0/returns/search", post(returns::search))
        .route("/api/v0/returns/:id", get(returns::get).patch(returns::update))
        .route(
            "/api/v0/statistics/customers/:id",
            get(statistics::customer),
        )
        .route(
            "/api/v0/statistics/categories/:id",
            get(statistics::category),
        )
        .route(
            "/api/v0/statistics/customers-top",
            get(statistics::top_customers),
        )
        .route("/api/v0/statistics/time/year", get(statistics::last_year))
        .route("/api/v0/statistics/time/month", get(statistics::last_month))
        .route("/api/v0/reports/products/:id", get(reports::product))
        .route("/api/v0/reports/customers/:id", get(reports::customer))
        .route("/api/v0/reports/categories/:id", get(reports::category))
        .route("/api/v0/sql", post(sql::execute))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .merge(protected_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "api-service"
    }))
}
