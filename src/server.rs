//! HTTP server initialization and runtime setup.
//!
//! Handles storage connections, migrations, state wiring and the Axum server
//! lifecycle.

use crate::config::{Config, StorageBackend, mask_connection_string};
use crate::domain::clock::SystemClock;
use crate::domain::repositories::{MappingRepository, StatsRepository};
use crate::infrastructure::memory::MemoryStore;
use crate::infrastructure::persistence::{PgMappingRepository, PgStatsRepository};
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

/// Repository handles for the configured backend.
pub struct Storage {
    pub mappings: Arc<dyn MappingRepository>,
    pub stats: Arc<dyn StatsRepository>,
    /// Present for the PostgreSQL backend only.
    pub pool: Option<PgPool>,
}

/// Opens the backend named by `config.database_url`.
///
/// For PostgreSQL this builds the pool from the `DB_*` settings and applies
/// pending migrations.
///
/// # Errors
///
/// Returns an error if the scheme is unsupported, the database is
/// unreachable or a migration fails.
pub async fn connect_storage(config: &Config) -> Result<Storage> {
    match config.storage_backend() {
        Some(StorageBackend::Memory) => {
            tracing::warn!("Using in-memory storage, data is lost on shutdown");
            let store = Arc::new(MemoryStore::new());
            Ok(Storage {
                mappings: store.clone(),
                stats: store,
                pool: None,
            })
        }
        Some(StorageBackend::Postgres) => {
            let pool = PgPoolOptions::new()
                .max_connections(config.db_max_connections)
                .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
                .idle_timeout(Duration::from_secs(config.db_idle_timeout))
                .max_lifetime(Duration::from_secs(config.db_max_lifetime))
                .connect(&config.database_url)
                .await
                .with_context(|| {
                    format!(
                        "Failed to connect to {}",
                        mask_connection_string(&config.database_url)
                    )
                })?;
            tracing::info!("Connected to database");

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to migrate")?;
            tracing::info!("Migrations applied");

            let shared = Arc::new(pool.clone());
            Ok(Storage {
                mappings: Arc::new(PgMappingRepository::new(shared.clone())),
                stats: Arc::new(PgStatsRepository::new(shared)),
                pool: Some(pool),
            })
        }
        None => anyhow::bail!(
            "Unsupported storage backend: {}",
            mask_connection_string(&config.database_url)
        ),
    }
}

/// Wires services over `storage` with a system clock in the configured offset.
///
/// # Errors
///
/// Returns an error if the configured clock offset is out of range.
pub fn build_state(config: &Config, storage: &Storage) -> Result<AppState> {
    let offset = config
        .clock_offset()
        .context("CLOCK_UTC_OFFSET_MINUTES is out of range")?;

    Ok(AppState::new(
        storage.mappings.clone(),
        storage.stats.clone(),
        Arc::new(SystemClock::new(offset)),
        config.base_url.clone(),
    ))
}

/// Runs the HTTP server with the given configuration until Ctrl+C.
///
/// # Errors
///
/// Returns an error if:
/// - Storage setup fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let storage = connect_storage(&config).await?;
    let state = build_state(&config, &storage)?;

    let app = app_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid LISTEN address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(pool) = storage.pool {
        pool.close().await;
    }
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
