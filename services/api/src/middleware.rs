//! Session authentication middleware

use axum::{
    body::Body,
    extract::State,
    http::{Request, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use common::{AuthContext, Permissions};

use crate::{error::ApiError, state::AppState};

/// Resolve the `Authorization` credential and attach the `AuthContext`.
///
/// Every failure, including a malformed header, yields the same 401.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let credential = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .map(|value| value.strip_prefix("Bearer ").unwrap_or(value))
        .ok_or(ApiError::Unauthorized)?;

    let context = state
        .session_repository
        .authenticate(credential)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    req.extensions_mut().insert(context);

    Ok(next.run(req).await)
}

/// Fail with 403 unless the caller holds every bit of `required`
pub fn require(auth: &AuthContext, required: Permissions) -> Result<(), ApiError> {
    if auth.can(required) {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}
