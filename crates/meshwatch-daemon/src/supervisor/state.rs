use chrono::{DateTime, Utc};
use meshwatch_types::{HealthState, ServicePhase, ServiceStatus};

/// Alert de-duplication state for the current failure episode. Modeled as a
/// tagged state rather than a bare flag so the transition table stays
/// exhaustive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AlertEpisode {
    /// No unreachable alert pending for the current run of probes.
    #[default]
    NonePending,
    /// An unreachable alert has fired for the current unbroken failure run.
    Alerted,
}

/// Mutable per-service state, owned by the supervisor loop and mutated only
/// from its serialization point.
#[derive(Clone, Debug, Default)]
pub struct ServiceRuntimeState {
    pub health: HealthState,
    pub phase: ServicePhase,
    pub consecutive_healthy: u32,
    pub consecutive_failures: u32,
    pub restart_count: u32,
    pub last_restart_at: Option<DateTime<Utc>>,
    pub episode: AlertEpisode,
}

impl ServiceRuntimeState {
    pub fn status(&self, id: &str, name: &str) -> ServiceStatus {
        ServiceStatus {
            id: id.to_string(),
            name: name.to_string(),
            health: self.health,
            phase: self.phase,
            restart_count: self.restart_count,
            consecutive_healthy: self.consecutive_healthy,
            consecutive_failures: self.consecutive_failures,
            last_restart_at: self.last_restart_at,
        }
    }
}
