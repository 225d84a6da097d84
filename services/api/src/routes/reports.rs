//! Report endpoints (`READ_REPORTS`)

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use common::{AuthContext, Permissions};

use crate::{
    error::{ApiError, ApiResult},
    middleware::require,
    repositories::reports::{CategoryReport, CustomerReport, ProductReport},
    state::AppState,
};

pub async fn product(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<Json<ProductReport>> {
    require(&auth, Permissions::READ_REPORTS)?;

    state
        .report_repository
        .product(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Unknown product".to_string()))
}

pub async fn customer(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<Json<CustomerReport>> {
    require(&auth, Permissions::READ_REPORTS)?;

    state
        .report_repository
        .customer(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Unknown customer".to_string()))
}

pub async fn category(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<Json<CategoryReport>> {
    require(&auth, Permissions::READ_REPORTS)?;

    state
        .report_repository
        .category(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Unknown category".to_string()))
}
