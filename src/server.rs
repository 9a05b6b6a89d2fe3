//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, cache setup, worker spawning, and Axum
//! server lifecycle. All components receive their dependencies here; nothing
//! reads configuration or reaches for a shared handle afterwards.

use crate::application::interceptors::InterceptorRegistry;
use crate::application::services::{FloodGuard, LinkService, StatsService};
use crate::config::Config;
use crate::domain::click_worker::run_click_worker;
use crate::domain::repositories::{LinkRepository, StatsRepository};
use crate::infrastructure::cache::{CacheService, NullCache, RedisCache};
use crate::infrastructure::geoip::{GeoIp, MaxMindGeoIp, NullGeoIp};
use crate::infrastructure::persistence::{PgLinkRepository, PgStatsRepository};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool + migrations
/// - Redis cache (or NullCache fallback)
/// - Geo-IP resolver (or NullGeoIp fallback)
/// - Background click worker
/// - Axum HTTP server
///
/// # Errors
///
/// Returns an error if the database connection, migrations, or server bind
/// fail.
pub async fn run(config: Config) -> Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    let cache: Arc<dyn CacheService> = if let Some(redis_url) = &config.redis_url {
        match RedisCache::connect(redis_url, config.cache_ttl_seconds).await {
            Ok(redis) => {
                tracing::info!("Cache enabled (Redis)");
                Arc::new(redis)
            }
            Err(e) => {
                tracing::warn!("Failed to connect to Redis: {}. Using NullCache.", e);
                Arc::new(NullCache::new())
            }
        }
    } else {
        tracing::info!("Cache disabled (NullCache)");
        Arc::new(NullCache::new())
    };

    let geoip: Arc<dyn GeoIp> = match &config.geoip_db_path {
        Some(path) => match MaxMindGeoIp::open(path) {
            Ok(resolver) => Arc::new(resolver),
            Err(e) => {
                tracing::warn!(
                    "Failed to load GeoIP database at {}: {}. Clicks go un-annotated.",
                    path,
                    e
                );
                Arc::new(NullGeoIp)
            }
        },
        None => Arc::new(NullGeoIp),
    };

    let pool = Arc::new(pool);
    let link_repository: Arc<dyn LinkRepository> =
        Arc::new(PgLinkRepository::new(pool.clone()));
    let stats_repository: Arc<dyn StatsRepository> =
        Arc::new(PgStatsRepository::new(pool.clone()));

    let (click_tx, click_rx) = mpsc::channel(config.click_queue_capacity);
    tokio::spawn(run_click_worker(
        click_rx,
        link_repository.clone(),
        stats_repository.clone(),
        geoip,
    ));
    tracing::info!("Click worker started");

    let flood_guard = FloodGuard::new(
        link_repository.clone(),
        config.flood_delay_seconds,
        config.flood_ip_whitelist.clone(),
    );

    // Interceptors are registered here, before the registry is shared.
    let interceptors = Arc::new(InterceptorRegistry::new());

    let link_service = Arc::new(LinkService::new(
        link_repository.clone(),
        flood_guard,
        interceptors,
        config.alphabet.alphabet(),
        config.reserved_keywords(),
        config.base_url.clone(),
        config.unique_urls,
    ));
    let stats_service = Arc::new(StatsService::new(link_repository, stats_repository));

    let state = AppState::new(
        link_service,
        stats_service,
        cache,
        click_tx,
        config.admin_token.clone(),
        config.behind_proxy,
    );

    let app = app_router(state, config.behind_proxy);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .await?;

    Ok(())
}
