//! Planwright server entry point.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::EnvFilter;

use planwright::adapters::http::{assistant_routes, AssistantAppState};
use planwright::adapters::{
    PostgresPendingCallRepository, PostgresPlanningReader, PostgresPlanningStore, PostgresSyncLog,
    RedisSyncBroadcaster,
};
use planwright::application::{
    ConfirmationService, ExecutionPipeline, PreviewGenerator, SyncService, ToolDispatcher,
};
use planwright::config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    config.validate()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level)),
        )
        .init();

    info!("starting planwright");

    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        info!("running database migrations");
        sqlx::migrate!("./migrations").run(&pool).await?;
    }

    let redis_client = redis::Client::open(config.redis.url.as_str())?;
    let redis_conn = redis_client.get_multiplexed_tokio_connection().await?;

    let reader = Arc::new(PostgresPlanningReader::new(pool.clone()));
    let store = Arc::new(PostgresPlanningStore::new(pool.clone()));
    let pending_calls = Arc::new(PostgresPendingCallRepository::new(pool.clone()));
    let broadcaster = Arc::new(
        RedisSyncBroadcaster::new(redis_conn)
            .with_channel_prefix(config.redis.channel_prefix.clone()),
    );
    let sync_log = Arc::new(PostgresSyncLog::new(pool));

    let dispatcher = Arc::new(ToolDispatcher::new(store, reader.clone()));
    let sync = Arc::new(SyncService::new(broadcaster, sync_log.clone()));
    let pipeline = Arc::new(ExecutionPipeline::new(dispatcher, sync));
    let previews = Arc::new(PreviewGenerator::new(reader));
    let confirmations = Arc::new(ConfirmationService::with_ttl_secs(
        pending_calls,
        previews.clone(),
        pipeline,
        config.assistant.pending_call_ttl_secs,
    ));

    let state = AssistantAppState {
        previews,
        confirmations,
        sync_log,
    };

    let app = axum::Router::new()
        .nest("/api", assistant_routes())
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .layer(tower_http::timeout::TimeoutLayer::new(
            std::time::Duration::from_secs(config.server.request_timeout_secs),
        ))
        .with_state(state);

    let addr = config.server.socket_addr()?;
    info!(%addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        return;
    }
    info!("shutdown signal received");
}
