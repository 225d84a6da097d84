//! Middleware for session credential validation

use axum::{
    body::Body,
    extract::State,
    http::{Request, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};

use crate::{AppState, error::AuthError};

/// Resolve the `Authorization` credential to a live session and store the
/// resulting `AuthContext` in the request extensions.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let credential = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .map(|value| value.strip_prefix("Bearer ").unwrap_or(value))
        .ok_or(AuthError::Unauthorized)?;

    let context = state
        .session_repository
        .authenticate(credential)
        .await?
        .ok_or(AuthError::Unauthorized)?;

    req.extensions_mut().insert(context);

    Ok(next.run(req).await)
}
