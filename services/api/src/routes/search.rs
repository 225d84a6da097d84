//! Search endpoints for the plain entities

use axum::{Json, extract::State};

use crate::{
    error::ApiResult,
    models::{
        Customer, ManagerSummary,
        catalog::{Category, Characteristic, Product},
    },
    search::{SearchPlan, SearchRequest, SearchResults, schema},
    state::AppState,
};

pub async fn categories(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> ApiResult<Json<SearchResults<Category>>> {
    let plan = SearchPlan::compile(&schema::CATEGORIES, &request);
    Ok(Json(state.search_repository.fetch(&plan).await?))
}

pub async fn characteristics(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> ApiResult<Json<SearchResults<Characteristic>>> {
    let plan = SearchPlan::compile(&schema::CHARACTERISTICS, &request);
    Ok(Json(state.search_repository.fetch(&plan).await?))
}

pub async fn products(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> ApiResult<Json<SearchResults<Product>>> {
    let plan = SearchPlan::compile(&schema::PRODUCTS, &request);
    Ok(Json(state.search_repository.fetch(&plan).await?))
}

pub async fn customers(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> ApiResult<Json<SearchResults<Customer>>> {
    let plan = SearchPlan::compile(&schema::CUSTOMERS, &request);
    Ok(Json(state.search_repository.fetch(&plan).await?))
}

pub async fn managers(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> ApiResult<Json<SearchResults<ManagerSummary>>> {
    let plan = SearchPlan::compile(&schema::MANAGERS, &request);
    Ok(Json(state.search_repository.fetch(&plan).await?))
}
