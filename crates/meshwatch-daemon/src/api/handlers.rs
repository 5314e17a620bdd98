use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use meshwatch_types::{MeshError, ServiceStatus, SHUTDOWN_CONFIRM_TOKEN};
use tracing::{info, warn};

use super::responses::*;
use super::AppState;
use crate::config::ServiceDescriptor;

/// Error wrapper mapping [`MeshError`] onto HTTP statuses.
pub struct ApiError(MeshError);

impl From<MeshError> for ApiError {
    fn from(err: MeshError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match self.0 {
            MeshError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            MeshError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            MeshError::Unauthorized(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            MeshError::Config(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL"),
        };

        let body = ErrorResponse {
            error: code,
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// `GET /health` — the supervisor's own liveness. Always succeeds while the
/// process runs.
pub async fn get_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        healthy: true,
        status: "running".into(),
        uptime_secs: state.watchdog.uptime_secs(),
    })
}

/// `GET /status` — full registry dump with runtime state.
pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        stats: state.watchdog.stats().await,
        services: state.watchdog.statuses().await,
    })
}

/// `GET /services` — static descriptors only.
pub async fn get_services(State(state): State<AppState>) -> Json<Vec<ServiceDescriptor>> {
    Json(state.watchdog.descriptors().await)
}

/// `POST /services/{id}/restart` — manual restart; clears exhaustion.
pub async fn post_restart(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ServiceStatus>, ApiError> {
    let status = state.watchdog.manual_restart(&id).await?;
    Ok(Json(status))
}

/// `POST /start-all` — start every eligible stopped service.
pub async fn post_start_all(State(state): State<AppState>) -> Json<StartAllResponse> {
    Json(StartAllResponse {
        started: state.watchdog.start_all().await,
    })
}

/// `POST /shutdown` — requires the confirmation sentinel in the body; an
/// absent or mismatched token is rejected with no state change.
pub async fn post_shutdown(
    State(state): State<AppState>,
    body: Option<Json<ShutdownRequest>>,
) -> Result<Json<ShutdownResponse>, ApiError> {
    let confirm = body.and_then(|Json(req)| req.confirm);

    match confirm.as_deref() {
        Some(token) if token == SHUTDOWN_CONFIRM_TOKEN => {
            info!("Shutdown confirmed via control API");
            let _ = state.shutdown.send(true);
            Ok(Json(ShutdownResponse { shutting_down: true }))
        }
        Some(_) => {
            warn!("Shutdown rejected: wrong confirmation token");
            Err(MeshError::Unauthorized("confirmation token mismatch".into()).into())
        }
        None => {
            warn!("Shutdown rejected: no confirmation token");
            Err(MeshError::Unauthorized("confirmation token required".into()).into())
        }
    }
}
