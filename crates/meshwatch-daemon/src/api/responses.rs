use meshwatch_types::ServiceStatus;
use serde::{Deserialize, Serialize};

use crate::supervisor::WatchdogStats;

#[derive(Serialize)]
pub struct HealthResponse {
    pub healthy: bool,
    pub status: String,
    pub uptime_secs: u64,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub stats: WatchdogStats,
    pub services: Vec<ServiceStatus>,
}

#[derive(Serialize)]
pub struct StartAllResponse {
    pub started: Vec<String>,
}

#[derive(Deserialize, Default)]
pub struct ShutdownRequest {
    pub confirm: Option<String>,
}

#[derive(Serialize)]
pub struct ShutdownResponse {
    pub shutting_down: bool,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    pub message: String,
}
