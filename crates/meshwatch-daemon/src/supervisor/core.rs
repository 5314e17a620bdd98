use chrono::{DateTime, Utc};
use meshwatch_types::{HealthState, MeshError, MeshResult, ServicePhase, ServiceStatus};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use super::cancellation::CancellationToken;
use super::state::ServiceRuntimeState;
use super::stats::WatchdogStats;
use crate::alerts::{AlertDispatcher, AlertSink, HttpAlertSink, LogOnlySink};
use crate::config::{PolicyConfig, ServiceDescriptor, WatchdogConfig, DEFAULT_STOP_GRACE_SECS};
use crate::policy::{self, PolicyAction};
use crate::probe::{HealthProber, ProbeOutcome};
use crate::process::{ProcessHandle, ProcessManager};

struct ServiceEntry {
    descriptor: Arc<ServiceDescriptor>,
    state: ServiceRuntimeState,
    process: Option<ProcessHandle>,
}

impl ServiceEntry {
    fn status(&self) -> ServiceStatus {
        self.state.status(&self.descriptor.id, &self.descriptor.name)
    }
}

/// The supervisor: owns the registry, drives the evaluation loop, and
/// exposes the operations behind the control surface.
///
/// All `ServiceRuntimeState` mutation happens behind the single write lock,
/// between probe rounds, so there is no concurrent read/write race on the
/// restart counters. Probes themselves run without the lock held.
pub struct Watchdog {
    services: RwLock<HashMap<String, ServiceEntry>>,
    prober: HealthProber,
    processes: ProcessManager,
    dispatcher: AlertDispatcher,
    policy: PolicyConfig,
    started_at: Instant,
    total_restarts: AtomicU64,
}

impl Watchdog {
    pub fn new(config: &WatchdogConfig, sink: Arc<dyn AlertSink>) -> MeshResult<Self> {
        let mut services = HashMap::new();
        for descriptor in &config.services {
            services.insert(
                descriptor.id.clone(),
                ServiceEntry {
                    descriptor: Arc::new(descriptor.clone()),
                    state: ServiceRuntimeState::default(),
                    process: None,
                },
            );
        }

        Ok(Self {
            services: RwLock::new(services),
            prober: HealthProber::new(config.policy.probe_timeout())?,
            processes: ProcessManager::new(Duration::from_secs(DEFAULT_STOP_GRACE_SECS)),
            dispatcher: AlertDispatcher::new(sink),
            policy: config.policy.clone(),
            started_at: Instant::now(),
            total_restarts: AtomicU64::new(0),
        })
    }

    /// Build with the sink implied by the alerts config: HTTP when an
    /// endpoint is configured, local log otherwise.
    pub fn from_config(config: &WatchdogConfig) -> MeshResult<Self> {
        let sink: Arc<dyn AlertSink> = match (config.alerts.enabled, &config.alerts.endpoint) {
            (true, Some(endpoint)) => Arc::new(HttpAlertSink::new(
                endpoint.clone(),
                Duration::from_secs(config.alerts.timeout_secs),
            )?),
            _ => Arc::new(LogOnlySink),
        };

        Self::new(config, sink)
    }

    /// One full evaluation cycle: probe every registered service
    /// concurrently, then apply the policy engine from the serialization
    /// point.
    pub async fn tick(&self) {
        let targets: Vec<(String, String)> = {
            let services = self.services.read().await;
            services
                .values()
                .map(|e| (e.descriptor.id.clone(), e.descriptor.health_url.clone()))
                .collect()
        };

        if targets.is_empty() {
            return;
        }

        let outcomes = self.prober.probe_all(&targets).await;
        self.apply_outcomes(outcomes, Utc::now()).await;
    }

    /// Apply a round of probe outcomes. Split from [`Watchdog::tick`] so
    /// tests can drive the loop with synthetic outcomes and fixed clocks.
    pub(crate) async fn apply_outcomes(
        &self,
        outcomes: Vec<(String, ProbeOutcome)>,
        now: DateTime<Utc>,
    ) {
        let mut services = self.services.write().await;

        for (id, outcome) in outcomes {
            let Some(entry) = services.get_mut(&id) else {
                continue;
            };

            // Reap a child that exited on its own since the last tick.
            if let Some(ref mut handle) = entry.process {
                if !handle.is_running() {
                    debug!("Service '{}' process exited (pid {})", id, handle.pid);
                    entry.process = None;
                }
            }

            let decision = policy::evaluate(
                &mut entry.state,
                entry.descriptor.auto_restart,
                &outcome,
                now,
                &self.policy,
            );

            if decision.action == PolicyAction::Restart {
                info!(
                    "Restarting service '{}' (attempt {}/{})",
                    id, entry.state.restart_count, self.policy.max_restarts
                );
                self.restart_process(entry).await;
            }

            for kind in decision.alerts {
                warn!("Service '{}': {}", id, kind);
                self.dispatcher
                    .dispatch(meshwatch_types::AlertEvent::new(id.clone(), kind, now));
            }
        }
    }

    /// Stop whatever we spawned previously and launch the command again.
    /// A spawn failure is logged and left for the next probe: the attempt
    /// was already counted by the policy engine, which is exactly the
    /// accounting a failed health probe would get.
    async fn restart_process(&self, entry: &mut ServiceEntry) {
        self.total_restarts.fetch_add(1, Ordering::Relaxed);

        if let Some(handle) = entry.process.take() {
            if let Err(e) = self.processes.stop(handle).await {
                warn!("Stopping service '{}' failed: {}", entry.descriptor.id, e);
            }
        }

        match self.processes.start(&entry.descriptor) {
            Ok(handle) => entry.process = Some(handle),
            Err(e) => error!("Restart spawn for '{}' failed: {}", entry.descriptor.id, e),
        }
    }

    /// Start every auto-restart-eligible service that is currently stopped.
    /// Returns the ids actually started.
    pub async fn start_all(&self) -> Vec<String> {
        let mut services = self.services.write().await;
        let mut started = Vec::new();

        for (id, entry) in services.iter_mut() {
            if !entry.descriptor.auto_restart || !entry.descriptor.is_managed() {
                continue;
            }
            if entry.state.phase != ServicePhase::Stopped {
                continue;
            }

            match self.processes.start(&entry.descriptor) {
                Ok(handle) => {
                    entry.process = Some(handle);
                    entry.state.phase = ServicePhase::Starting;
                    started.push(id.clone());
                }
                Err(e) => warn!("Initial start of '{}' failed: {}", id, e),
            }
        }

        if !started.is_empty() {
            info!("Started {} service(s): {}", started.len(), started.join(", "));
        }
        started
    }

    /// Operator-initiated restart. Always clears exhaustion: the counter
    /// resets to zero before the attempt, then the attempt is recorded as if
    /// the policy had triggered it. Rejected while a policy-issued restart
    /// is still inside its cooldown window.
    pub async fn manual_restart(&self, id: &str) -> MeshResult<ServiceStatus> {
        let now = Utc::now();
        let mut services = self.services.write().await;

        let entry = services
            .get_mut(id)
            .ok_or_else(|| MeshError::NotFound(id.to_string()))?;

        if !entry.descriptor.is_managed() {
            return Err(MeshError::Config(format!(
                "service '{}' has no start command and cannot be restarted",
                id
            )));
        }

        if entry.state.phase == ServicePhase::Restarting {
            if let Some(last) = entry.state.last_restart_at {
                if now - last < self.policy.cooldown() {
                    return Err(MeshError::Conflict(format!(
                        "service '{}' has a restart pending",
                        id
                    )));
                }
            }
        }

        info!("Manual restart of service '{}'", id);
        policy::arm_manual_restart(&mut entry.state, now);
        self.restart_process(entry).await;

        if entry.process.is_none() {
            return Err(MeshError::Process(format!(
                "service '{}' failed to spawn; attempt recorded",
                id
            )));
        }

        Ok(entry.status())
    }

    /// Runtime snapshot of every service, ordered by id for stable output.
    pub async fn statuses(&self) -> Vec<ServiceStatus> {
        let services = self.services.read().await;
        let mut statuses: Vec<ServiceStatus> = services.values().map(|e| e.status()).collect();
        statuses.sort_by(|a, b| a.id.cmp(&b.id));
        statuses
    }

    /// The static registry, ordered by id.
    pub async fn descriptors(&self) -> Vec<ServiceDescriptor> {
        let services = self.services.read().await;
        let mut descriptors: Vec<ServiceDescriptor> = services
            .values()
            .map(|e| e.descriptor.as_ref().clone())
            .collect();
        descriptors.sort_by(|a, b| a.id.cmp(&b.id));
        descriptors
    }

    pub async fn stats(&self) -> WatchdogStats {
        let services = self.services.read().await;
        let count = |h: HealthState| services.values().filter(|e| e.state.health == h).count();

        WatchdogStats {
            total_services: services.len(),
            healthy: count(HealthState::Healthy),
            degraded: count(HealthState::Degraded),
            unreachable: count(HealthState::Unreachable),
            unknown: count(HealthState::Unknown),
            exhausted: services
                .values()
                .filter(|e| e.state.phase == ServicePhase::Exhausted)
                .count(),
            total_restarts: self.total_restarts.load(Ordering::Relaxed),
            total_alerts: self.dispatcher.total_dispatched(),
            uptime_secs: self.started_at.elapsed().as_secs(),
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    /// Stop every process this supervisor spawned. Called on shutdown.
    pub async fn stop_all_processes(&self) {
        let mut services = self.services.write().await;
        for (id, entry) in services.iter_mut() {
            if let Some(handle) = entry.process.take() {
                if let Err(e) = self.processes.stop(handle).await {
                    warn!("Stopping service '{}' on shutdown failed: {}", id, e);
                }
                entry.state.phase = ServicePhase::Stopped;
            }
        }
        info!("All managed processes stopped");
    }

    /// Drive evaluation cycles on the configured interval until cancelled.
    pub async fn run_loop(self: Arc<Self>, mut cancel: CancellationToken) {
        let mut interval = tokio::time::interval(self.policy.tick_interval());
        // The first interval tick fires immediately; that gives us an
        // initial health picture right after startup.
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.tick().await;
                }
                _ = cancel.cancelled() => {
                    break;
                }
            }
        }
        debug!("Supervisor loop ended");
    }
}
