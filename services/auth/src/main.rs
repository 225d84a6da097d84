use anyhow::Result;
use tracing::info;

use auth::{AppState, bootstrap, create_router};
use common::{
    config::ServerConfig,
    database::{DatabaseConfig, health_check, init_pool, run_migrations},
    session::SessionConfig,
    telemetry::init_tracing,
};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    info!("Starting authentication service");

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    run_migrations(&pool).await?;

    let app_state = AppState::new(pool, &SessionConfig::from_env());

    if let Some(admin) = bootstrap::BootstrapAdmin::from_env() {
        bootstrap::ensure_admin(&app_state.manager_repository, admin).await?;
    }

    let purged = app_state.session_repository.purge_expired().await?;
    info!("Purged {} expired sessions", purged);

    let limits = app_state.rate_limiter.config();
    info!(
        "Login limit: {} attempts per {}s, ban {}s",
        limits.max_attempts, limits.window_seconds, limits.ban_duration_seconds
    );

    info!("Authentication service initialized successfully");

    // Start the web server
    let server_config = ServerConfig::from_env("AUTH", 3000)?;
    let app = create_router(app_state);

    let listener = tokio::net::TcpListener::bind(server_config.bind_address()).await?;
    info!(
        "Authentication service listening on {}",
        server_config.bind_address()
    );

    axum::serve(listener, app).await?;

    Ok(())
}
