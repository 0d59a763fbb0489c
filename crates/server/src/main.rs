//! Pollbox server entry point.

use std::sync::Arc;

use anyhow::Context;
use axum::{Router, http::HeaderValue};
use pollbox_api::{AppState, router as api_router};
use pollbox_common::Config;
use pollbox_core::{
    BroadcastPollEventPublisher, InMemoryPollStore, PollEvent, PollService,
};
use tokio::{signal, sync::broadcast};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

/// Logs which views went stale after each poll change.
async fn log_poll_events(mut rx: broadcast::Receiver<PollEvent>) {
    loop {
        match rx.recv().await {
            Ok(event) => {
                tracing::debug!(
                    poll_id = %event.poll_id(),
                    paths = ?event.affected_paths(),
                    "Poll views invalidated"
                );
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Poll event listener lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

fn cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    Ok(match &config.server.cors_origin {
        Some(origin) => layer.allow_origin(
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("Invalid CORS origin: {origin}"))?,
        ),
        None => layer.allow_origin(Any),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pollbox=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting pollbox server...");

    // Load configuration
    let config = Config::load().context("Failed to load configuration")?;

    // Initialize store
    let store = InMemoryPollStore::new();
    if config.polls.seed_demo {
        store.seed_demo().await;
    }

    // Initialize services
    let publisher = BroadcastPollEventPublisher::new(256);
    tokio::spawn(log_poll_events(publisher.subscribe()));
    let poll_service = PollService::new(Arc::new(store), Arc::new(publisher));

    let state = AppState::new(poll_service, config.polls.default_page_size);

    let app = Router::new()
        .nest("/api", api_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config)?)
        .with_state(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}
