//! Authentication service routes

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, patch, post},
};
use common::{
    AuthContext, NewManager, Permissions,
    password::{hash_password, verify_dummy, verify_password},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::{
    AppState,
    error::{AuthError, AuthResult},
    middleware::session_middleware,
    validation::{validate_email, validate_name, validate_password},
};

/// Request for manager login
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response for manager login
#[derive(Serialize)]
pub struct LoginResponse {
    /// Composite `session_id.manager_id.token` credential
    pub token: String,
}

/// Request for a permission change
#[derive(Deserialize)]
pub struct UpdatePermissionsRequest {
    pub permissions: Permissions,
}

/// Request for a password change
#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Create the router for the authentication service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/api/v0/auth/logout", post(logout))
        .route("/api/v0/managers", post(create_manager))
        .route("/api/v0/managers/me", get(current_manager))
        .route("/api/v0/managers/me/password", patch(change_password))
        .route("/api/v0/managers/:id/permissions", patch(update_permissions))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/v0/auth/login", post(login))
        .merge(protected_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "auth-service"
    }))
}

/// Manager login endpoint
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AuthResult<impl IntoResponse> {
    let limiter_key = payload.email.trim().to_lowercase();
    if !state.rate_limiter.is_allowed(&limiter_key).await {
        warn!("Throttled login attempt for {}", limiter_key);
        return Err(AuthError::TooManyAttempts);
    }

    let manager = state.manager_repository.find_by_email(&payload.email).await?;

    let manager = match manager {
        Some(manager) if verify_password(&payload.password, &manager.password) => manager,
        found => {
            if found.is_none() {
                verify_dummy(&payload.password);
            }
            state.rate_limiter.record_failure(&limiter_key).await;
            info!("Failed login attempt for {}", limiter_key);
            return Err(AuthError::InvalidCredentials);
        }
    };

    state.rate_limiter.reset(&limiter_key).await;

    let credential = state.session_repository.create(manager.id).await?;
    info!(manager_id = manager.id, "Manager logged in");

    Ok((
        StatusCode::OK,
        Json(LoginResponse {
            token: credential.to_string(),
        }),
    ))
}

/// Logout endpoint; ends the session that authenticated this request
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> AuthResult<StatusCode> {
    let deleted = state.session_repository.delete(auth.session.id).await?;
    if !deleted {
        // Lost a race with a concurrent logout of the same session
        return Err(AuthError::Unauthorized);
    }

    info!(session_id = auth.session.id, "Manager logged out");
    Ok(StatusCode::NO_CONTENT)
}

/// Create a manager (administrators only)
pub async fn create_manager(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<NewManager>,
) -> AuthResult<impl IntoResponse> {
    if !auth.can(Permissions::ADMIN) {
        return Err(AuthError::Forbidden);
    }

    validate_name("First name", &payload.first_name).map_err(AuthError::BadRequest)?;
    validate_name("Last name", &payload.last_name).map_err(AuthError::BadRequest)?;
    validate_email(&payload.email).map_err(AuthError::BadRequest)?;
    validate_password(&payload.password).map_err(AuthError::BadRequest)?;

    let password_hash = hash_password(&payload.password).map_err(|e| {
        error!("{}", e);
        AuthError::InternalServerError
    })?;

    let manager = state
        .manager_repository
        .create(&payload, &password_hash)
        .await
        .map_err(|e| {
            if e.is_unique_violation() {
                AuthError::Conflict("A manager with this email already exists".to_string())
            } else {
                AuthError::Database(e)
            }
        })?;

    Ok((StatusCode::CREATED, Json(manager)))
}

/// The manager behind the current session
pub async fn current_manager(Extension(auth): Extension<AuthContext>) -> impl IntoResponse {
    Json(auth.manager)
}

/// Replace a manager's permissions (administrators only)
pub async fn update_permissions(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdatePermissionsRequest>,
) -> AuthResult<impl IntoResponse> {
    if !auth.can(Permissions::ADMIN) {
        return Err(AuthError::Forbidden);
    }

    let manager = state
        .manager_repository
        .update_permissions(id, payload.permissions)
        .await?
        .ok_or_else(|| AuthError::NotFound("Unknown manager".to_string()))?;

    Ok(Json(manager))
}

/// Change the current manager's password and end their other sessions
pub async fn change_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<ChangePasswordRequest>,
) -> AuthResult<StatusCode> {
    if !verify_password(&payload.current_password, &auth.manager.password) {
        return Err(AuthError::BadRequest(
            "Current password is incorrect".to_string(),
        ));
    }
    validate_password(&payload.new_password).map_err(AuthError::BadRequest)?;

    let password_hash = hash_password(&payload.new_password).map_err(|e| {
        error!("{}", e);
        AuthError::InternalServerError
    })?;

    state
        .manager_repository
        .update_password(auth.manager.id, &password_hash)
        .await?;

    let revoked = state
        .session_repository
        .delete_others(auth.manager.id, auth.session.id)
        .await?;
    info!(manager_id = auth.manager.id, revoked, "Password changed");

    Ok(StatusCode::NO_CONTENT)
}
