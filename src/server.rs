//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, geolocation setup, worker spawning, and Axum
//! server lifecycle.

use crate::application::services::{
    AuthService, ClickService, EndingPoolService, LinkService, StatsService,
};
use crate::config::Config;
use crate::domain::click_worker::{ClickQueue, run_click_worker};
use crate::domain::geolocation::GeoLocator;
use crate::domain::repositories::{ClickRepository, EndingPoolRepository, LinkRepository};
use crate::infrastructure::geoip::{HttpGeoLocator, NullGeoLocator};
use crate::infrastructure::persistence::{
    PgClickRepository, PgEndingPoolRepository, PgLinkRepository,
};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Opens the PostgreSQL pool with the configured limits.
///
/// # Errors
///
/// Returns an error if the database cannot be reached.
pub async fn connect_database(config: &Config) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool
/// - Apply migrations
/// - Geolocation client (or NullGeoLocator when `GEOIP_URL` is unset)
/// - Background click worker
/// - Axum HTTP server
///
/// On Ctrl+C the server stops accepting requests and the click worker drains
/// the queued visits before returning.
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = connect_database(&config).await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to migrate")?;

    let geo_locator: Arc<dyn GeoLocator> = match &config.geoip_url {
        Some(url) => {
            tracing::info!("Geolocation enabled");
            Arc::new(HttpGeoLocator::new(url, config.geoip_timeout())?)
        }
        None => {
            tracing::info!("Geolocation disabled (NullGeoLocator)");
            Arc::new(NullGeoLocator::new())
        }
    };

    let pool = Arc::new(pool);
    let link_repository: Arc<dyn LinkRepository> = Arc::new(PgLinkRepository::new(pool.clone()));
    let pool_repository: Arc<dyn EndingPoolRepository> =
        Arc::new(PgEndingPoolRepository::new(pool.clone()));
    let click_repository: Arc<dyn ClickRepository> =
        Arc::new(PgClickRepository::new(pool.clone()));

    let stats_service = Arc::new(StatsService::new(
        link_repository.clone(),
        click_repository.clone(),
    ));
    let ending_pool = Arc::new(EndingPoolService::new(
        link_repository.clone(),
        pool_repository,
        config.allocation.generator(),
    ));
    let link_service = Arc::new(LinkService::new(
        link_repository,
        ending_pool,
        config.base_url.clone(),
    ));
    let click_service = Arc::new(ClickService::new(
        click_repository,
        geo_locator,
        config.ignore_visitor_ips.clone(),
        config.geoip_timeout(),
    ));
    let auth_service = Arc::new(AuthService::new(&config.api_keys));

    let (click_queue, click_rx) = ClickQueue::channel(config.click_queue_capacity);
    let worker = tokio::spawn(run_click_worker(
        click_rx,
        click_service,
        config.click_worker_concurrency,
    ));

    let state = AppState::new(
        link_service,
        stats_service,
        auth_service,
        click_queue,
        config.behind_proxy,
    );
    let app = app_router(state);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped, draining click queue");
    if let Err(e) = worker.await {
        tracing::error!("Click worker terminated abnormally: {}", e);
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
