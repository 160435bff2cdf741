//! Observatory HTTP Server Binary
//!
//! Loads configuration, opens the persistent cache, starts the warm-up and
//! the periodic visibility cleanup in the background and serves the REST API.
//!
//! # Usage
//!
//! ```bash
//! # In-memory cache (default when CACHE_DIR is unset)
//! cargo run --bin observatory-server
//!
//! # Cache persisted under ./cache
//! CACHE_DIR=./cache cargo run --bin observatory-server
//! ```
//!
//! # Environment Variables
//!
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8080)
//! - `REPOSITORY_TYPE`: `file` or `local`
//! - `CACHE_DIR`: Root of the file cache (implies `file`)
//! - `OBSERVER_LAT`, `OBSERVER_LON`: Reference observer
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use lunar_observatory::config::ObservatoryConfig;
use lunar_observatory::db::RepositoryFactory;
use lunar_observatory::ephemeris::SiderustEphemeris;
use lunar_observatory::http::{create_router, AppState};
use lunar_observatory::services::Observatory;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting Lunar Observatory HTTP Server");

    let config = ObservatoryConfig::load()?;

    // Env selection wins; otherwise repository.toml; otherwise in-memory
    let repository = if env::var("REPOSITORY_TYPE").is_ok() || env::var("CACHE_DIR").is_ok() {
        RepositoryFactory::from_env().await?
    } else {
        match RepositoryFactory::from_default_config().await {
            Ok(repo) => repo,
            Err(e) => {
                warn!("No usable repository.toml ({}), falling back to memory", e);
                RepositoryFactory::create_local()
            }
        }
    };
    info!("Repository initialized successfully");

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let observatory = Arc::new(Observatory::new(
        Arc::new(SiderustEphemeris::new()),
        repository,
        config,
    )?);

    let warm = Arc::clone(&observatory);
    tokio::spawn(async move {
        let report = warm.warm_up().await;
        info!(
            "Cache warm-up finished: {} days filled, years scheduled {:?}",
            report.filled_days, report.scheduled_years
        );
    });

    // Warm-up already cleaned up once, so the first tick is skipped
    let cleaner = Arc::clone(&observatory);
    tokio::spawn(async move {
        let settings = cleaner.config().cache.clone();
        let mut ticker =
            tokio::time::interval(Duration::from_secs(settings.cleanup_interval_hours * 3600));
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match cleaner
                .cleanup_old_visibility(settings.visibility_retention_days)
                .await
            {
                Ok(removed) => info!("Periodic cleanup removed {} visibility entries", removed),
                Err(e) => warn!("Periodic visibility cleanup failed: {}", e),
            }
        }
    });

    let app = create_router(AppState::new(observatory));

    info!("Server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
