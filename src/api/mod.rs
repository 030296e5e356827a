//! OKR Board HTTP Surface
//!
//! Server-rendered page and JSON API, built with Axum.
//!
//! # Endpoints
//!
//! ## Page
//! - `GET /` - The OKR page
//! - `POST /objectives` - Objective form (redirects to `/`)
//! - `POST /key-results` - Key result form (redirects to `/`)
//!
//! ## JSON
//! - `GET /api/v1/okr` - Current view state
//! - `POST /api/v1/objectives` - Create an objective
//! - `POST /api/v1/key-results` - Create a key result
//!
//! ## Health
//! - `GET /health/live` - Liveness check
//! - `GET /health/ready` - Readiness check
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
//! use okr_board::api::{serve, AppState};
//! use okr_board::config::Config;
//! use okr_board::remote::RestClient;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load_default();
//!     let store = Arc::new(RestClient::new(config.remote.clone())?);
//!     let state = AppState::new(store, config.view.refresh, config.server.clone());
//!     serve(state, &config.server).await?;
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod render;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::ServerConfig;
use crate::view::ViewLifetime;

/// Build the router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let page_routes = Router::new()
        .route("/", get(routes::page::show_page))
        .route("/objectives", post(routes::page::submit_objective))
        .route("/key-results", post(routes::page::submit_key_result));

    let api_routes = Router::new()
        .route("/okr", get(routes::okr::get_state))
        .route("/objectives", post(routes::okr::create_objective))
        .route("/key-results", post(routes::okr::create_key_result));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let shared_state = Arc::new(state);

    page_routes
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(shared_state)
}

/// Start the server and run until a shutdown signal arrives.
///
/// The view is deactivated when shutdown starts, so results of calls still in
/// flight are dropped.
pub async fn serve(state: AppState, config: &ServerConfig) -> Result<(), ApiError> {
    let lifetime = state.lifetime.clone();
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("OKR board listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(lifetime))
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("OKR board shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal, then detach the view
async fn shutdown_signal(lifetime: ViewLifetime) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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

    tracing::info!("Shutdown signal received, starting graceful shutdown");
    lifetime.deactivate();
}
