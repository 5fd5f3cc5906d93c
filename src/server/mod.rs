//! HTTP gateway over a shared [`TagClassifier`](crate::TagClassifier).
//!
//! This module provides:
//! - The axum router and its middleware (`build_router`)
//! - Route handlers (`routes`) and error mapping (`error`)
//! - The OpenAPI document and its Swagger UI / ReDoc pages (`openapi`)
//! - Configuration and secrets loading for `tagd` (`config`)

pub mod config;
pub mod error;
pub mod openapi;
pub mod routes;
pub mod state;

use std::net::SocketAddr;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

pub use config::{Config, LimitsConfig, Secrets};
pub use error::{ApiError, ErrorResponse};
pub use openapi::ApiDoc;
pub use state::AppState;

/// Build the router with all routes and middleware.
///
/// Layers, outermost first: request tracing, in-flight request limit,
/// body size limit. The request limit is one semaphore shared by every
/// route and the fallback.
pub fn build_router(state: AppState, limits: &LimitsConfig) -> Router {
    Router::new()
        .route("/", get(routes::health))
        .route("/info", get(routes::info))
        .route("/classify", post(routes::classify))
        .route(openapi::OPENAPI_JSON_PATH, get(openapi::openapi_json))
        .route("/docs", get(openapi::swagger_ui))
        .route("/redoc", get(openapi::redoc))
        .fallback(routes::not_found)
        .layer(DefaultBodyLimit::max(limits.max_body_bytes))
        .layer(GlobalConcurrencyLimitLayer::new(limits.max_concurrent_requests))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl+C or SIGTERM.
pub async fn serve(addr: SocketAddr, router: Router) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
