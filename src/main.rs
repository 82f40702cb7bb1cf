use std::sync::Arc;

use anyhow::Context;
use axum::http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use dpms_api::app::{app, AppState, Stores};
use dpms_api::auth::{InMemoryRevocationStore, RevocationStore, TokenService};
use dpms_api::config::{AppConfig, CacheConfig, SecurityConfig};
use dpms_api::database::DatabaseManager;
use dpms_api::services::SearchService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dpms_api=info,tower_http=info")),
        )
        .init();

    // Initialize configuration (this loads the config singleton)
    let config: &AppConfig = dpms_api::config::config();
    config.validate().context("invalid configuration")?;
    info!("Starting DPMS API in {:?} mode", config.environment);

    let stores = match &config.database.url {
        Some(_) => {
            let pool = DatabaseManager::init(&config.database)
                .await
                .context("failed to connect to database")?;
            Stores::postgres(pool, config.database.enable_query_logging, config.database.slow_query_threshold())
        }
        None => {
            if dpms_api::is_development!() {
                info!("DATABASE_URL not set, serving from in-memory stores");
            } else {
                warn!("DATABASE_URL not set outside development, serving from empty in-memory stores");
            }
            Stores::in_memory()
        }
    };

    let tokens = token_service(&config.security, &config.cache).await?;
    let state = AppState::new(
        Arc::new(tokens),
        stores,
        SearchService::new(config.pagination.default_page_size),
        config.database.query_timeout(),
        config.cache.operation_timeout(),
    );

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!("DPMS API listening on http://{}", bind_addr);

    axum::serve(listener, app(state, cors_layer(&config.security)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    DatabaseManager::close().await;
    info!("DPMS API stopped");
    Ok(())
}

async fn token_service(security: &SecurityConfig, cache: &CacheConfig) -> anyhow::Result<TokenService> {
    let store = revocation_store(cache).await?;
    TokenService::new(
        &security.jwt_secret,
        security.access_token_ttl(),
        security.refresh_token_ttl(),
        store,
    )
    .context("failed to build token service")
}

#[cfg(feature = "redis")]
async fn revocation_store(cache: &CacheConfig) -> anyhow::Result<Arc<dyn RevocationStore>> {
    match &cache.redis_url {
        Some(url) => {
            let store = dpms_api::auth::revocation::RedisRevocationStore::connect(url)
                .await
                .context("failed to connect to Redis")?;
            info!("Token revocation backed by Redis");
            Ok(Arc::new(store))
        }
        None => Ok(Arc::new(InMemoryRevocationStore::new())),
    }
}

#[cfg(not(feature = "redis"))]
async fn revocation_store(cache: &CacheConfig) -> anyhow::Result<Arc<dyn RevocationStore>> {
    if cache.redis_url.is_some() {
        warn!("REDIS_URL is set but the redis feature is disabled; revocations stay in process");
    }
    Ok(Arc::new(InMemoryRevocationStore::new()))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
