//! Alert delivery to the message relay.
//!
//! Delivery is fire-and-forget: the supervisor loop must never wait on the
//! relay. De-duplication is the policy engine's job; this module only ships
//! whatever events the engine produced for a tick.

use async_trait::async_trait;
use meshwatch_types::{AlertEvent, MeshError, MeshResult};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Destination for alert events. Implemented over HTTP in production and by
/// a recording sink in tests.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn send(&self, event: &AlertEvent) -> MeshResult<()>;
}

/// POSTs alert events as JSON to the configured relay endpoint.
pub struct HttpAlertSink {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpAlertSink {
    pub fn new(endpoint: String, timeout: Duration) -> MeshResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MeshError::Network(format!("Failed to build alert client: {}", e)))?;

        Ok(Self { client, endpoint })
    }
}

#[async_trait]
impl AlertSink for HttpAlertSink {
    async fn send(&self, event: &AlertEvent) -> MeshResult<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(event)
            .send()
            .await
            .map_err(|e| MeshError::Network(format!("Alert POST failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(MeshError::Network(format!(
                "Alert relay answered {}",
                response.status()
            )));
        }

        Ok(())
    }
}

/// Sink used when no relay is configured: alerts only reach the local log.
pub struct LogOnlySink;

#[async_trait]
impl AlertSink for LogOnlySink {
    async fn send(&self, event: &AlertEvent) -> MeshResult<()> {
        info!("ALERT {} for service '{}'", event.event, event.service_id);
        Ok(())
    }
}

/// Hands events to the sink on a detached task so the caller never blocks.
pub struct AlertDispatcher {
    sink: Arc<dyn AlertSink>,
    dispatched: AtomicU64,
}

impl AlertDispatcher {
    pub fn new(sink: Arc<dyn AlertSink>) -> Self {
        Self {
            sink,
            dispatched: AtomicU64::new(0),
        }
    }

    /// Fire-and-forget. Delivery failures are logged and swallowed; they
    /// never affect restart policy.
    pub fn dispatch(&self, event: AlertEvent) {
        self.dispatched.fetch_add(1, Ordering::Relaxed);
        debug!("Dispatching {} for service '{}'", event.event, event.service_id);

        let sink = self.sink.clone();
        tokio::spawn(async move {
            if let Err(e) = sink.send(&event).await {
                warn!(
                    "Alert delivery failed for service '{}' ({}): {}",
                    event.service_id, event.event, e
                );
            }
        });
    }

    pub fn total_dispatched(&self) -> u64 {
        self.dispatched.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use tokio::sync::Mutex;

    /// Records every event it receives; used by supervisor and API tests.
    #[derive(Default)]
    pub struct RecordingSink {
        pub events: Mutex<Vec<AlertEvent>>,
    }

    #[async_trait]
    impl AlertSink for RecordingSink {
        async fn send(&self, event: &AlertEvent) -> MeshResult<()> {
            self.events.lock().await.push(event.clone());
            Ok(())
        }
    }
}
