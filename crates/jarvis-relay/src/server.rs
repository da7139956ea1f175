//! HTTP server for the chat relay
//!
//! Every handler reaches session state through the `AppState` handed to the
//! router. The only outbound network call is the completion request.

use anyhow::Context;
use axum::{
    http::Method,
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;

use crate::{config::Config, shared_state::AppState};

/// Run the relay until Ctrl-C or SIGTERM
pub async fn run_server(cfg: Config) -> anyhow::Result<()> {
    // No-op when the binary already installed a subscriber.
    crate::telemetry::init_tracing();
    crate::metrics::init_metrics();
    cfg.print_config();

    info!("Starting JARVIS relay");

    let addr = cfg.api_addr()?;
    let state = AppState::from_config(cfg);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind HTTP listener on {}", addr))?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Shutting down JARVIS relay");
    Ok(())
}

/// Build the relay router around an already-constructed state
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    let response_deadline = state.config.response_deadline();

    Router::new()
        .route("/health", get(crate::api::health_api::health))
        .route("/chat", post(crate::api::chat_api::chat))
        .route("/chat/:session_id", delete(crate::api::chat_api::clear_chat))
        .route("/metrics", get(crate::metrics::get_metrics))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(response_deadline))
        .with_state(state)
}

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
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received");
}
