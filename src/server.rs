//! Composition root: builds every client explicitly, serves HTTP and tears
//! everything down in order.

use crate::application::background::BackgroundTasks;
use crate::application::services::UrlService;
use crate::config::{CacheBackend, Config, StoreBackend};
use crate::domain::click_worker::run_click_worker;
use crate::domain::repositories::RecordStore;
use crate::infrastructure::cache::{
    CacheService, MemoryCache, NullCache, RedisCache, connect_manager,
};
use crate::infrastructure::clicks::{ClickEmitter, QueueClickEmitter, RedisClickPublisher};
use crate::infrastructure::persistence::{
    CachedShortUrlRepository, InMemoryRecordStore, PgRecordStore,
};
use crate::routes::app_router;
use crate::state::AppState;
use crate::utils::id_generator::RandomIdGenerator;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use redis::aio::ConnectionManager;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Upper bound on waiting for background work at shutdown.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// Handles whose lifecycle ends after the HTTP server stops.
pub struct Runtime {
    pool: Option<PgPool>,
    click_worker: Option<JoinHandle<()>>,
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes, in order:
/// - Record store (PostgreSQL with migrations, or in-memory)
/// - Redis connection, shared by the cache and the click publisher
/// - Cache backend
/// - Background task pool
/// - Click emitter (Redis channel, or local queue plus aggregation worker)
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let (state, runtime) = build_state(&config).await?;
    let tasks = state.tasks.clone();

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

    tracing::info!("HTTP server stopped, draining background tasks");
    if tokio::time::timeout(SHUTDOWN_GRACE, tasks.flush())
        .await
        .is_err()
    {
        tracing::warn!(
            pending = tasks.pending(),
            "Background tasks did not finish in time"
        );
    }
    drop(tasks);

    runtime.shutdown().await;
    Ok(())
}

/// Builds the application state from configuration.
///
/// Must run inside a Tokio runtime: the background task worker and, when
/// clicks are aggregated locally, the click worker are spawned here.
///
/// # Errors
///
/// Returns an error if the record store cannot be reached or migrated.
pub async fn build_state(config: &Config) -> Result<(AppState, Runtime)> {
    let (record_store, pool) = build_record_store(config).await?;

    let redis = match &config.redis_url {
        Some(url) if needs_redis(config) => match connect_manager(url).await {
            Ok(manager) => {
                tracing::info!("Connected to Redis");
                Some(manager)
            }
            Err(e) => {
                tracing::warn!("Failed to connect to Redis: {}. Continuing without it.", e);
                None
            }
        },
        _ => None,
    };

    let cache = build_cache(config, redis.clone());

    let tasks = BackgroundTasks::start(config.task_queue_capacity, config.task_concurrency);
    tracing::info!(
        capacity = config.task_queue_capacity,
        concurrency = config.task_concurrency,
        "Background task pool started"
    );

    let (click_emitter, click_worker) = build_click_emitter(config, redis, record_store.clone());

    let repository = Arc::new(CachedShortUrlRepository::new(
        record_store.clone(),
        cache.clone(),
        tasks.clone(),
    ));
    let url_service = Arc::new(UrlService::new(
        repository,
        Arc::new(RandomIdGenerator::new(config.id_length)),
        click_emitter.clone(),
        tasks.clone(),
    ));

    let state = AppState {
        url_service,
        record_store,
        cache,
        click_emitter,
        tasks,
        public_base_url: config.public_base_url.clone(),
        disabled_redirect_path: config.disabled_redirect_path.clone(),
    };

    Ok((state, Runtime { pool, click_worker }))
}

impl Runtime {
    /// Waits for the click worker to drain and closes the database pool.
    ///
    /// Call after every [`AppState`] clone has been dropped, otherwise the
    /// click queue stays open and the worker is abandoned after the grace
    /// period.
    pub async fn shutdown(self) {
        if let Some(worker) = self.click_worker
            && tokio::time::timeout(SHUTDOWN_GRACE, worker).await.is_err()
        {
            tracing::warn!("Click worker did not finish in time");
        }

        if let Some(pool) = self.pool {
            pool.close().await;
            tracing::info!("Database pool closed");
        }
    }
}

fn needs_redis(config: &Config) -> bool {
    config.cache_backend == CacheBackend::Redis || config.click_channel.is_some()
}

async fn build_record_store(
    config: &Config,
) -> Result<(Arc<dyn RecordStore>, Option<PgPool>)> {
    match config.store_backend {
        StoreBackend::Memory => {
            tracing::info!("Using in-memory record store");
            Ok((Arc::new(InMemoryRecordStore::new()), None))
        }
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL is required for the postgres store")?;

            let pool = PgPoolOptions::new()
                .max_connections(config.db_max_connections)
                .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
                .idle_timeout(Duration::from_secs(config.db_idle_timeout))
                .max_lifetime(Duration::from_secs(config.db_max_lifetime))
                .connect(database_url)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Connected to database");

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to run migrations")?;

            let store = PgRecordStore::new(Arc::new(pool.clone()));
            Ok((Arc::new(store), Some(pool)))
        }
    }
}

fn build_cache(config: &Config, redis: Option<ConnectionManager>) -> Arc<dyn CacheService> {
    match (config.cache_backend, redis) {
        (CacheBackend::Redis, Some(manager)) => {
            tracing::info!("Cache enabled (Redis, ttl {}s)", config.cache_ttl_seconds);
            Arc::new(RedisCache::from_manager(manager, config.cache_ttl_seconds))
        }
        (CacheBackend::Redis, None) => {
            tracing::warn!("Redis unavailable, using NullCache");
            Arc::new(NullCache::new())
        }
        (CacheBackend::Memory, _) => {
            tracing::info!("Cache enabled (memory, ttl {}s)", config.cache_ttl_seconds);
            Arc::new(MemoryCache::new(Duration::from_secs(
                config.cache_ttl_seconds,
            )))
        }
        (CacheBackend::None, _) => {
            tracing::info!("Cache disabled (NullCache)");
            Arc::new(NullCache::new())
        }
    }
}

fn build_click_emitter(
    config: &Config,
    redis: Option<ConnectionManager>,
    record_store: Arc<dyn RecordStore>,
) -> (Arc<dyn ClickEmitter>, Option<JoinHandle<()>>) {
    match (&config.click_channel, redis) {
        (Some(channel), Some(manager)) => {
            tracing::info!("Publishing clicks to Redis channel '{}'", channel);
            (
                Arc::new(RedisClickPublisher::new(manager, channel.clone())),
                None,
            )
        }
        (channel, _) => {
            if channel.is_some() {
                tracing::warn!("Redis unavailable, aggregating clicks in-process");
            }

            let (tx, rx) = mpsc::channel(config.click_queue_capacity);
            let worker = tokio::spawn(run_click_worker(
                rx,
                record_store,
                config.click_worker_concurrency,
            ));
            tracing::info!("Click worker started");

            (Arc::new(QueueClickEmitter::new(tx)), Some(worker))
        }
    }
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl-C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
