//! Team sorter backend entrypoint wiring REST, SSE, and the roster storage layers.

use std::{env, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use team_sorter_back::{
    config::AppConfig,
    dao::{
        roster_store::{RosterStore, memory::MemoryRosterStore},
        storage::StorageError,
    },
    routes,
    services::{sse_events, storage_supervisor},
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let app_state = AppState::new(AppConfig::load());

    spawn_storage_supervisor(app_state.clone()).context("configuring storage")?;
    tokio::spawn(sse_events::forward_degraded_changes(app_state.clone()));
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

/// Start the supervisor against CouchDB when it is configured, otherwise against process memory.
#[cfg(feature = "couch-store")]
fn spawn_storage_supervisor(state: SharedState) -> anyhow::Result<()> {
    use team_sorter_back::dao::roster_store::couchdb::{CouchConfig, CouchRosterStore};

    let Some(config) = CouchConfig::from_env()? else {
        spawn_memory_supervisor(state);
        return Ok(());
    };

    info!(base_url = %config.base_url, database = %config.database, "using CouchDB roster store");
    tokio::spawn(storage_supervisor::run(state, move || {
        let config = config.clone();
        async move {
            let store = CouchRosterStore::connect(config).await?;
            Ok::<_, StorageError>(Arc::new(store) as Arc<dyn RosterStore>)
        }
    }));
    Ok(())
}

#[cfg(not(feature = "couch-store"))]
fn spawn_storage_supervisor(state: SharedState) -> anyhow::Result<()> {
    spawn_memory_supervisor(state);
    Ok(())
}

fn spawn_memory_supervisor(state: SharedState) {
    info!("no database configured; keeping the roster in memory");
    let store = MemoryRosterStore::new();
    tokio::spawn(storage_supervisor::run(state, move || {
        let store = store.clone();
        async move { Ok::<_, StorageError>(Arc::new(store) as Arc<dyn RosterStore>) }
    }));
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

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
