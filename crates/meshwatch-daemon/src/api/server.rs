use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use meshwatch_types::{MeshError, MeshResult};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::watch;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::handlers;
use crate::config::ApiConfig;
use crate::supervisor::{CancellationToken, Watchdog};

/// Shared state for every handler.
#[derive(Clone)]
pub struct AppState {
    pub watchdog: Arc<Watchdog>,
    pub shutdown: Arc<watch::Sender<bool>>,
}

/// Build the control-surface router. Separated from [`serve`] so tests can
/// drive it without a listener.
pub fn router(state: AppState, config: &ApiConfig) -> Router {
    let mut app = Router::new()
        .route("/health", get(handlers::get_health))
        .route("/status", get(handlers::get_status))
        .route("/services", get(handlers::get_services))
        .route("/services/:id/restart", post(handlers::post_restart))
        .route("/start-all", post(handlers::post_start_all))
        .route("/shutdown", post(handlers::post_shutdown))
        .with_state(state);

    if config.cors_enabled {
        let origin = if config.cors_origins.is_empty() {
            AllowOrigin::from(Any)
        } else {
            let origins: Vec<HeaderValue> = config
                .cors_origins
                .iter()
                .filter_map(|o| o.parse().ok())
                .collect();
            AllowOrigin::list(origins)
        };
        let cors = CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    app.layer(TraceLayer::new_for_http())
}

/// Bind and serve the control surface until the token fires.
pub async fn serve(
    addr: SocketAddr,
    state: AppState,
    config: &ApiConfig,
    mut cancel: CancellationToken,
) -> MeshResult<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| MeshError::Network(format!("Failed to bind control API: {}", e)))?;

    info!("Control API listening on http://{}", addr);

    let app = router(state, config);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
        .map_err(|e| MeshError::Network(format!("Control API server error: {}", e)))
}
