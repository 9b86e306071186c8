use anyhow::Result;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod access;
mod error;
mod invite;
mod middleware;
mod models;
mod repositories;
mod routes;
mod state;
mod validation;

use common::{
    config::ServerConfig,
    database, shutdown,
    token::{TokenConfig, TokenService},
};
use tokio::net::TcpListener;

use crate::{
    repositories::{GroupRepository, ScheduleRepository},
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting API service");

    // Initialize database connection pool
    let db_config = database::DatabaseConfig::from_env()?;
    let pool = database::init_pool(&db_config).await?;

    if database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    database::run_migrations(&pool).await?;

    let token_service = TokenService::new(TokenConfig::from_env()?);

    let app_state = AppState {
        db_pool: pool.clone(),
        token_service,
        schedule_repository: ScheduleRepository::new(pool.clone()),
        group_repository: GroupRepository::new(pool.clone()),
    };

    info!("API service initialized successfully");

    // Start the web server
    let app = routes::create_router(app_state);

    let server_config = ServerConfig::load("API", 3001)?;
    let listener = TcpListener::bind(server_config.bind_address()).await?;
    info!("API service listening on {}", server_config.bind_address());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::signal())
        .await?;

    pool.close().await;
    info!("API service stopped");

    Ok(())
}
