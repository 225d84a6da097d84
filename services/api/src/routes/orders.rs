//! Order endpoints

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use common::{AuthContext, Permissions};

use crate::{
    composition::OrderView,
    error::{ApiError, ApiResult},
    middleware::require,
    models::orders::{NewOrder, OrderListQuery, OrderUpdate},
    search::{SearchPlan, SearchRequest, SearchResults, schema},
    state::AppState,
};

const DEFAULT_LIST_LIMIT: i64 = 50;

/// Place an order
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<NewOrder>,
) -> ApiResult<impl IntoResponse> {
    require(&auth, Permissions::MANAGE_ORDERS)?;

    let order = state.order_repository.place(&payload).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// Page through all orders
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
) -> ApiResult<Json<SearchResults<OrderView>>> {
    let page = query.page.unwrap_or(0).max(0);
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, crate::search::plan::MAX_PAGE_SIZE);

    Ok(Json(state.order_repository.list(page, limit).await?))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<OrderView>> {
    state
        .order_repository
        .find(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Unknown order".to_string()))
}

/// Change status, address or type of an order
pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    Json(payload): Json<OrderUpdate>,
) -> ApiResult<Json<OrderView>> {
    require(&auth, Permissions::MANAGE_ORDERS)?;

    state
        .order_repository
        .update(id, &payload)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Unknown order".to_string()))
}

pub async fn search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> ApiResult<Json<SearchResults<OrderView>>> {
    let plan = SearchPlan::compile(&schema::ORDERS, &request);
    let (ids, count) = state.search_repository.fetch_ids(&plan).await?;
    let results = state.order_repository.load_views(&ids).await?;

    Ok(Json(SearchResults { results, count }))
}
