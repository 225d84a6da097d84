use anyhow::Result;
use tracing::info;

use api::{AppState, create_router};
use common::{
    config::ServerConfig,
    database::{DatabaseConfig, health_check, init_pool, run_migrations},
    session::SessionConfig,
    telemetry::init_tracing,
};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    info!("Starting API service");

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

    info!("API service initialized successfully");

    let app_state = AppState::new(pool, &SessionConfig::from_env());

    // Start the web server
    let server_config = ServerConfig::from_env("API", 3001)?;
    let app = create_router(app_state);

    let listener = tokio::net::TcpListener::bind(server_config.bind_address()).await?;
    info!("API service listening on {}", server_config.bind_address());

    axum::serve(listener, app).await?;

    Ok(())
}
