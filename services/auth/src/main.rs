use std::net::SocketAddr;

use anyhow::Context as _;
use sea_orm::Database;

use leadgate_auth::config::AuthConfig;
use leadgate_auth::infra::ratelimit::{AppRateLimiter, MemoryRateLimiter, RedisRateLimiter};
use leadgate_auth::router::build_router;
use leadgate_auth::state::AppState;
use leadgate_core::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    leadgate_core::tracing::init_tracing();
    let config = AuthConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .context("connect to database")?;

    let rate_limiter = match &config.redis_url {
        Some(url) => {
            let pool = deadpool_redis::Config::from_url(url)
                .create_pool(Some(deadpool_redis::Runtime::Tokio1))
                .context("create redis pool")?;
            tracing::info!("rate limiting backed by redis");
            AppRateLimiter::Redis(RedisRateLimiter { pool })
        }
        None => {
            tracing::info!("rate limiting in-process");
            AppRateLimiter::Memory(MemoryRateLimiter::new())
        }
    };

    let state = AppState::new(db, rate_limiter, &config);
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.auth_port));
    tracing::info!(%addr, "auth service listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("bind listener")?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("serve")?;

    Ok(())
}
