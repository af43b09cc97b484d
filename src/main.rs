//! tictactoe-back binary entrypoint wiring REST, WebSocket, cache and durable store layers.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(feature = "couch-store")]
use tictactoe_back::dao::session_store::couchdb::{CouchConfig, CouchSessionStore};
#[cfg(feature = "mongo-store")]
use tictactoe_back::dao::session_store::mongodb::{MongoConfig, MongoSessionStore};
use tictactoe_back::{
    config::{AppConfig, StorageBackend},
    dao::{
        session_cache::MemoryCache,
        session_store::{MemorySessionStore, SessionStore},
        storage::StorageError,
    },
    routes,
    services::{outcome_reconciler, storage_supervisor},
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::load();
    let cache = MemoryCache::new();
    tokio::spawn(sweep_expired(cache.clone(), config.session_ttl()));

    let app_state = AppState::new(config, Arc::new(cache));
    start_storage(app_state.clone(), StorageBackend::from_env()).await;
    tokio::spawn(outcome_reconciler::run(app_state.clone()));

    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state);

    let port = env::var("PORT")
        .or_else(|_| env::var("SERVER_PORT"))
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    let service = app.into_make_service();
    axum::serve(listener, service)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Install the selected durable store, supervised in the background for database backends.
async fn start_storage(state: SharedState, backend: StorageBackend) {
    info!(backend = ?backend, "selected session store");
    match backend {
        #[cfg(feature = "mongo-store")]
        StorageBackend::Mongo => {
            tokio::spawn(storage_supervisor::run(state, || async {
                let config = MongoConfig::from_env().await?;
                let store = MongoSessionStore::connect(config).await?;
                Ok::<_, StorageError>(Arc::new(store) as Arc<dyn SessionStore>)
            }));
        }
        #[cfg(feature = "couch-store")]
        StorageBackend::Couch => {
            tokio::spawn(storage_supervisor::run(state, || async {
                let config = CouchConfig::from_env()?;
                let store = CouchSessionStore::connect(config).await?;
                Ok::<_, StorageError>(Arc::new(store) as Arc<dyn SessionStore>)
            }));
        }
        StorageBackend::Memory => {
            warn!("using the in-memory session store; finished sessions are lost on restart");
            state
                .set_session_store(Arc::new(MemorySessionStore::new()))
                .await;
        }
    }
}

/// Drop expired live states so abandoned sessions do not pile up in memory.
async fn sweep_expired(cache: MemoryCache, period: std::time::Duration) {
    let mut ticker = tokio::time::interval(period);
    loop {
        ticker.tick().await;
        let purged = cache.purge_expired();
        if purged > 0 {
            info!(purged, "purged expired live sessions");
        }
    }
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler; waiting for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
