//! Return endpoints

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use common::{AuthContext, Permissions};

use crate::{
    composition::ReturnView,
    error::{ApiError, ApiResult},
    middleware::require,
    models::returns::{NewReturn, ReturnUpdate},
    search::{SearchPlan, SearchRequest, SearchResults, schema},
    state::AppState,
};

pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<NewReturn>,
) -> ApiResult<impl IntoResponse> {
    require(&auth, Permissions::MANAGE_ORDERS)?;

    let view = state.return_repository.create(&payload).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<ReturnView>> {
    state
        .return_repository
        .find(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Unknown return".to_string()))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    Json(payload): Json<ReturnUpdate>,
) -> ApiResult<Json<ReturnView>> {
    require(&auth, Permissions::MANAGE_ORDERS)?;

    Ok(Json(state.return_repository.update(id, &payload).await?))
}

pub async fn search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> ApiResult<Json<SearchResults<ReturnView>>> {
    let plan = SearchPlan::compile(&schema::RETURNS, &request);
    let (ids, count) = state.search_repository.fetch_ids(&plan).await?;
    let results = state.return_repository.load_views(&ids).await?;

    Ok(Json(SearchResults { results, count }))
}
