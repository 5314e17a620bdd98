//! Shared types for the Meshwatch service supervisor.
//!
//! Everything that crosses a process boundary lives here: the health and
//! lifecycle enums reported by `/status`, the alert events POSTed to the
//! relay, and the error type used across the workspace. The daemon and any
//! dashboard rendering supervisor state depend on this crate, nothing else.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Default port for the supervisor's own control API.
pub const DEFAULT_API_PORT: u16 = 8710;

/// Sentinel string a `POST /shutdown` body must carry before the supervisor
/// will terminate itself. An accidental call must never take down the one
/// process responsible for restarting everything else.
pub const SHUTDOWN_CONFIRM_TOKEN: &str = "halt-the-mesh";

/// Errors produced anywhere in the meshwatch workspace.
#[derive(Error, Debug)]
pub enum MeshError {
    /// Configuration could not be read, parsed, or validated.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network-level failure (bind, connect, request).
    #[error("Network error: {0}")]
    Network(String),

    /// A managed process could not be spawned or stopped.
    #[error("Process error: {0}")]
    Process(String),

    /// The referenced service id is not in the registry.
    #[error("Unknown service: {0}")]
    NotFound(String),

    /// The operation conflicts with an in-flight one.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The caller did not present the required confirmation.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Serialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Anything that should not happen.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Workspace-wide result alias.
pub type MeshResult<T> = Result<T, MeshError>;

/// Health of a managed service as observed by the most recent probe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    /// Not probed yet.
    #[default]
    Unknown,
    /// Last probe returned 2xx within the timeout.
    Healthy,
    /// The endpoint answered, but with a non-2xx status. The process is up
    /// but unwell.
    Degraded,
    /// Connection refused, timeout, or resolution failure.
    Unreachable,
}

impl fmt::Display for HealthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthState::Unknown => write!(f, "unknown"),
            HealthState::Healthy => write!(f, "healthy"),
            HealthState::Degraded => write!(f, "degraded"),
            HealthState::Unreachable => write!(f, "unreachable"),
        }
    }
}

/// Lifecycle phase of a service from the restart policy's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ServicePhase {
    /// Not started by this supervisor.
    #[default]
    Stopped,
    /// Start command issued, no healthy probe seen yet.
    Starting,
    /// At least one probe has succeeded since the last (re)start.
    Running,
    /// A restart attempt was just issued; awaiting the next probes.
    Restarting,
    /// Restart budget spent without recovery. Terminal until a manual
    /// restart resets the counter.
    Exhausted,
}

impl fmt::Display for ServicePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServicePhase::Stopped => write!(f, "stopped"),
            ServicePhase::Starting => write!(f, "starting"),
            ServicePhase::Running => write!(f, "running"),
            ServicePhase::Restarting => write!(f, "restarting"),
            ServicePhase::Exhausted => write!(f, "exhausted"),
        }
    }
}

/// Kind of notification sent to the alert relay.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertKind {
    /// First unreachable probe of a failure episode.
    BecameUnreachable,
    /// Health left the unreachable state.
    Recovered,
    /// The restart budget is spent; operator action required.
    RestartExhausted,
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertKind::BecameUnreachable => write!(f, "BECAME_UNREACHABLE"),
            AlertKind::Recovered => write!(f, "RECOVERED"),
            AlertKind::RestartExhausted => write!(f, "RESTART_EXHAUSTED"),
        }
    }
}

/// Wire format of one alert delivered to the relay endpoint.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertEvent {
    /// Registry id of the affected service.
    pub service_id: String,
    /// What happened.
    pub event: AlertKind,
    /// When the supervisor observed it.
    pub timestamp: DateTime<Utc>,
}

impl AlertEvent {
    /// Build an alert stamped with the given observation time.
    pub fn new(service_id: impl Into<String>, event: AlertKind, timestamp: DateTime<Utc>) -> Self {
        Self {
            service_id: service_id.into(),
            event,
            timestamp,
        }
    }
}

/// Per-service runtime snapshot returned by `GET /status`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceStatus {
    /// Registry id.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Most recent probe classification.
    pub health: HealthState,
    /// Lifecycle phase.
    pub phase: ServicePhase,
    /// Restart attempts since the policy last re-armed.
    pub restart_count: u32,
    /// Unbroken healthy probes.
    pub consecutive_healthy: u32,
    /// Unbroken failed probes.
    pub consecutive_failures: u32,
    /// When the last restart attempt was issued, if any.
    pub last_restart_at: Option<DateTime<Utc>>,
}
