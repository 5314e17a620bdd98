use serde::{Deserialize, Serialize};

use super::constants::DEFAULT_ALERT_TIMEOUT_SECS;

/// Where state-change notifications go. The endpoint is a message relay
/// accepting POSTed JSON alert events; delivery is best-effort.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertsConfig {
    pub enabled: bool,
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: None,
            timeout_secs: DEFAULT_ALERT_TIMEOUT_SECS,
        }
    }
}
