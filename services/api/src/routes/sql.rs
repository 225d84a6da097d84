//! Read-only SQL console (`EXECUTE_SQL`)

use axum::{Extension, Json, extract::State};
use common::{AuthContext, Permissions};
use serde::Deserialize;
use tracing::info;

use crate::{
    error::ApiResult, middleware::require, repositories::console::ConsoleResult,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct ExecuteSql {
    pub query: String,
}

pub async fn execute(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<ExecuteSql>,
) -> ApiResult<Json<ConsoleResult>> {
    require(&auth, Permissions::EXECUTE_SQL)?;

    info!(manager_id = auth.manager.id, "Console query");
    Ok(Json(state.console_repository.execute(&payload.query).await?))
}
