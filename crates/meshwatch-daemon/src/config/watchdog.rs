use meshwatch_types::{MeshError, MeshResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use tracing::{info, warn};

use super::alerts::AlertsConfig;
use super::api::ApiConfig;
use super::policy::PolicyConfig;
use super::service::ServiceDescriptor;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchdogConfig {
    pub data_dir: PathBuf,
    pub api: ApiConfig,
    pub policy: PolicyConfig,
    pub alerts: AlertsConfig,
    #[serde(rename = "services")]
    pub services: Vec<ServiceDescriptor>,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("/var/lib/meshwatch"));
        Self {
            data_dir: home.join(".meshwatch"),
            api: ApiConfig::default(),
            policy: PolicyConfig::default(),
            alerts: AlertsConfig::default(),
            services: Vec::new(),
        }
    }
}

impl WatchdogConfig {
    pub fn load(path: impl AsRef<std::path::Path>) -> MeshResult<Self> {
        let path = path.as_ref();

        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .map_err(|e| MeshError::Config(format!("Failed to read config: {}", e)))?;

            toml::from_str(&contents)
                .map_err(|e| MeshError::Config(format!("Failed to parse config: {}", e)))?
        } else {
            info!("Config file not found, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<std::path::Path>) -> MeshResult<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| MeshError::Config(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| MeshError::Config(format!("Failed to create config dir: {}", e)))?;
        }

        std::fs::write(path.as_ref(), contents)
            .map_err(|e| MeshError::Config(format!("Failed to write config: {}", e)))?;

        info!("Configuration saved to {:?}", path.as_ref());
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(port) = std::env::var("MESHWATCH_API_PORT") {
            if let Ok(p) = port.parse() {
                self.api.port = p;
            }
        }

        if let Ok(bind) = std::env::var("MESHWATCH_API_BIND") {
            self.apply_bind_override(&bind);
        }

        if let Ok(url) = std::env::var("MESHWATCH_ALERT_URL") {
            self.alerts.endpoint = Some(url);
        }
    }

    pub(crate) fn apply_bind_override(&mut self, bind: &str) {
        if let Ok(addr) = bind.parse::<IpAddr>() {
            self.api.bind_address = addr;
            if !addr.is_loopback() {
                warn!(
                    "Control API binding to non-localhost address: {}. Ensure proper firewall rules.",
                    addr
                );
            }
        }
    }

    pub fn validate(&self) -> MeshResult<()> {
        if self.api.port == 0 {
            return Err(MeshError::Config("api.port must not be 0".into()));
        }

        if self.policy.tick_secs == 0 {
            return Err(MeshError::Config("policy.tick_secs must not be 0".into()));
        }

        if self.policy.probe_timeout_secs >= self.policy.tick_secs {
            return Err(MeshError::Config(
                "policy.probe_timeout_secs must be shorter than the tick interval".into(),
            ));
        }

        if self.policy.healthy_streak == 0 {
            return Err(MeshError::Config("policy.healthy_streak must not be 0".into()));
        }

        if self.alerts.enabled {
            if let Some(ref url) = self.alerts.endpoint {
                reqwest::Url::parse(url).map_err(|e| {
                    MeshError::Config(format!("alerts.endpoint is not a valid URL: {}", e))
                })?;
            }
        }

        let mut ids = HashSet::new();
        for service in &self.services {
            service.validate()?;

            if !ids.insert(service.id.as_str()) {
                return Err(MeshError::Config(format!(
                    "duplicate service id '{}'",
                    service.id
                )));
            }

            if service.port == self.api.port {
                return Err(MeshError::Config(format!(
                    "service '{}' uses port {}, which collides with the control API",
                    service.id, service.port
                )));
            }
        }

        Ok(())
    }

    pub fn api_addr(&self) -> SocketAddr {
        SocketAddr::new(self.api.bind_address, self.api.port)
    }

    pub fn api_is_localhost_only(&self) -> bool {
        self.api.bind_address.is_loopback()
    }

    /// Example configuration written by `meshwatch init`: a couple of real
    /// mesh services plus one passive collaborator that must never be
    /// auto-restarted.
    pub fn sample() -> Self {
        Self {
            services: vec![
                ServiceDescriptor {
                    id: "relay".into(),
                    name: "Message Relay".into(),
                    port: 8720,
                    working_dir: Some(PathBuf::from("/opt/mesh/relay")),
                    command: vec!["/opt/mesh/relay/relayd".into(), "--port".into(), "8720".into()],
                    health_url: "http://127.0.0.1:8720/health".into(),
                    auto_restart: true,
                },
                ServiceDescriptor {
                    id: "discovery".into(),
                    name: "Device Discovery".into(),
                    port: 8721,
                    working_dir: Some(PathBuf::from("/opt/mesh/discovery")),
                    command: vec!["/opt/mesh/discovery/discoveryd".into()],
                    health_url: "http://127.0.0.1:8721/health".into(),
                    auto_restart: true,
                },
                ServiceDescriptor {
                    id: "key-forwarder".into(),
                    name: "Key Forwarder".into(),
                    port: 8722,
                    working_dir: None,
                    command: vec![],
                    health_url: "http://127.0.0.1:8722/health".into(),
                    auto_restart: false,
                },
            ],
            ..Self::default()
        }
    }
}
