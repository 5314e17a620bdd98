use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::constants::{
    DEFAULT_COOLDOWN_SECS, DEFAULT_HEALTHY_STREAK, DEFAULT_MAX_RESTARTS,
    DEFAULT_PROBE_TIMEOUT_SECS, DEFAULT_TICK_SECS,
};

/// Tunables for the restart policy engine and the supervisor loop.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub tick_secs: u64,
    pub probe_timeout_secs: u64,
    pub cooldown_secs: u64,
    pub max_restarts: u32,
    pub healthy_streak: u32,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            tick_secs: DEFAULT_TICK_SECS,
            probe_timeout_secs: DEFAULT_PROBE_TIMEOUT_SECS,
            cooldown_secs: DEFAULT_COOLDOWN_SECS,
            max_restarts: DEFAULT_MAX_RESTARTS,
            healthy_streak: DEFAULT_HEALTHY_STREAK,
        }
    }
}

impl PolicyConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn cooldown(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.cooldown_secs as i64)
    }
}
