use meshwatch_types::{MeshError, MeshResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Static declaration of one managed service, loaded at startup and
/// immutable thereafter.
///
/// Services without a start command are passive collaborators (for example a
/// key-forwarder launched by the desktop session): the supervisor probes
/// them and reports their health, but can never restart them.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ServiceDescriptor {
    /// Unique registry key.
    pub id: String,
    /// Display name for dashboards and logs.
    pub name: String,
    /// Port the service listens on, for operator reference.
    pub port: u16,
    /// Working directory the start command runs in.
    pub working_dir: Option<PathBuf>,
    /// Start command as argv. Empty means the supervisor cannot start this
    /// service.
    pub command: Vec<String>,
    /// Health-check URL; a GET returning 2xx means healthy.
    pub health_url: String,
    /// Whether the restart policy may act on this service.
    pub auto_restart: bool,
}

impl ServiceDescriptor {
    /// Whether this supervisor can start the service at all.
    pub fn is_managed(&self) -> bool {
        !self.command.is_empty()
    }

    pub fn validate(&self) -> MeshResult<()> {
        if self.id.is_empty() {
            return Err(MeshError::Config("service id must not be empty".into()));
        }
        if self.id.contains(char::is_whitespace) || self.id.contains('/') {
            return Err(MeshError::Config(format!(
                "service id '{}' must not contain whitespace or '/'",
                self.id
            )));
        }
        if self.health_url.is_empty() {
            return Err(MeshError::Config(format!(
                "service '{}' has no health_url",
                self.id
            )));
        }
        if reqwest::Url::parse(&self.health_url).is_err() {
            return Err(MeshError::Config(format!(
                "service '{}' has an invalid health_url: {}",
                self.id, self.health_url
            )));
        }
        if self.auto_restart && !self.is_managed() {
            return Err(MeshError::Config(format!(
                "service '{}' has auto_restart enabled but no start command",
                self.id
            )));
        }
        Ok(())
    }
}
