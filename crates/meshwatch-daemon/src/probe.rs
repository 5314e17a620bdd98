//! Single-shot health probes.
//!
//! One probe is one bounded-timeout GET. Classification is the prober's only
//! job; retries and restarts belong to the policy engine. Probes for
//! distinct services run concurrently so one slow endpoint cannot starve the
//! rest of a tick.

use futures::future::join_all;
use meshwatch_types::{HealthState, MeshError, MeshResult};
use std::time::Duration;
use tracing::debug;

/// Outcome of one probe against one service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// 2xx within the timeout.
    Healthy,
    /// The endpoint answered with the given non-2xx status.
    Degraded(u16),
    /// Connection refused, timeout, or resolution failure.
    Unreachable(String),
}

impl ProbeOutcome {
    pub fn health(&self) -> HealthState {
        match self {
            ProbeOutcome::Healthy => HealthState::Healthy,
            ProbeOutcome::Degraded(_) => HealthState::Degraded,
            ProbeOutcome::Unreachable(_) => HealthState::Unreachable,
        }
    }

    /// Degraded and unreachable both count as failures for restart
    /// eligibility.
    pub fn is_failure(&self) -> bool {
        !matches!(self, ProbeOutcome::Healthy)
    }
}

pub struct HealthProber {
    client: reqwest::Client,
}

impl HealthProber {
    pub fn new(timeout: Duration) -> MeshResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MeshError::Network(format!("Failed to build probe client: {}", e)))?;

        Ok(Self { client })
    }

    /// Issue one GET and classify the outcome. Never returns an error: every
    /// failure mode maps onto a [`ProbeOutcome`].
    pub async fn probe(&self, url: &str) -> ProbeOutcome {
        match self.client.get(url).send().await {
            Ok(resp) if resp.status().is_success() => {
                debug!("Probe {} -> {}", url, resp.status());
                ProbeOutcome::Healthy
            }
            Ok(resp) => {
                debug!("Probe {} -> {}", url, resp.status());
                ProbeOutcome::Degraded(resp.status().as_u16())
            }
            Err(e) => {
                let reason = if e.is_timeout() {
                    "timeout".to_string()
                } else if e.is_connect() {
                    "connection failed".to_string()
                } else {
                    e.to_string()
                };
                debug!("Probe {} -> unreachable ({})", url, reason);
                ProbeOutcome::Unreachable(reason)
            }
        }
    }

    /// Probe every `(id, url)` pair concurrently, preserving ids.
    pub async fn probe_all(&self, targets: &[(String, String)]) -> Vec<(String, ProbeOutcome)> {
        let futures = targets.iter().map(|(id, url)| async move {
            let outcome = self.probe(url).await;
            (id.clone(), outcome)
        });

        join_all(futures).await
    }
}
