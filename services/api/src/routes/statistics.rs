//! Statistics endpoints (`READ_STATISTICS`)

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use common::{AuthContext, Permissions};
use serde::Deserialize;

use crate::{
    error::{ApiError, ApiResult},
    middleware::require,
    repositories::statistics::{
        CategoryStatistics, CustomerStatistics, DailyTotals, MonthlyTotals, TopCustomer,
    },
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct TopQuery {
    pub count: Option<i64>,
}

pub async fn customer(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<Json<CustomerStatistics>> {
    require(&auth, Permissions::READ_STATISTICS)?;

    state
        .statistics_repository
        .customer(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Unknown customer".to_string()))
}

pub async fn category(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<Json<CategoryStatistics>> {
    require(&auth, Permissions::READ_STATISTICS)?;

    state
        .statistics_repository
        .category(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Unknown category".to_string()))
}

pub async fn top_customers(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<TopQuery>,
) -> ApiResult<Json<Vec<TopCustomer>>> {
    require(&auth, Permissions::READ_STATISTICS)?;

    let count = query.count.unwrap_or(100).clamp(0, 1000);
    Ok(Json(state.statistics_repository.top_customers(count).await?))
}

pub async fn last_year(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<MonthlyTotals>>> {
    require(&auth, Permissions::READ_STATISTICS)?;

    Ok(Json(state.statistics_repository.last_year().await?))
}

pub async fn last_month(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<DailyTotals>>> {
    require(&auth, Permissions::READ_STATISTICS)?;

    Ok(Json(state.statistics_repository.last_month().await?))
}
