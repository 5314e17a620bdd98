use serde::Serialize;

/// Aggregate view of the registry, surfaced by `GET /status`.
#[derive(Clone, Debug, Serialize)]
pub struct WatchdogStats {
    pub total_services: usize,
    pub healthy: usize,
    pub degraded: usize,
    pub unreachable: usize,
    pub unknown: usize,
    pub exhausted: usize,
    pub total_restarts: u64,
    pub total_alerts: u64,
    pub uptime_secs: u64,
}
