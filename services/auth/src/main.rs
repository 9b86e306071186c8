use anyhow::Result;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod middleware;
mod models;
mod password;
mod rate_limiter;
mod repositories;
mod routes;
mod validation;

use common::{
    config::ServerConfig,
    database, shutdown,
    token::{TokenConfig, TokenService},
};
use sqlx::PgPool;
use tokio::net::TcpListener;

use crate::{
    rate_limiter::{RateLimiter, RateLimiterConfig},
    repositories::UserRepository,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub token_service: TokenService,
    pub user_repository: UserRepository,
    pub rate_limiter: RateLimiter,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting authentication service");

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
    if token_service.access_token_expiry().is_none() {
        info!("JWT_ACCESS_TOKEN_EXPIRY not set, issuing non-expiring tokens");
    }

    password::prepare_dummy_hash().await?;

    let app_state = AppState {
        db_pool: pool.clone(),
        token_service,
        user_repository: UserRepository::new(pool.clone()),
        rate_limiter: RateLimiter::new(RateLimiterConfig::default()),
    };

    // Start the web server
    let app = routes::create_router(app_state);

    let server_config = ServerConfig::load("AUTH", 3000)?;
    let listener = TcpListener::bind(server_config.bind_address()).await?;
    info!(
        "Authentication service listening on {}",
        server_config.bind_address()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::signal())
        .await?;

    pool.close().await;
    info!("Authentication service stopped");

    Ok(())
}
