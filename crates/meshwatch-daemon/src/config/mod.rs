mod alerts;
mod api;
mod constants;
mod policy;
mod service;
mod watchdog;

pub use alerts::AlertsConfig;
pub use api::ApiConfig;
pub use constants::*;
pub use policy::PolicyConfig;
pub use service::ServiceDescriptor;
pub use watchdog::WatchdogConfig;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::net::{IpAddr, Ipv4Addr};

    fn managed_service(id: &str, port: u16) -> ServiceDescriptor {
        ServiceDescriptor {
            id: id.into(),
            name: id.into(),
            port,
            working_dir: None,
            command: vec!["/bin/true".into()],
            health_url: format!("http://127.0.0.1:{}/health", port),
            auto_restart: true,
        }
    }

    #[test]
    fn test_default_config_validates() {
        let config = WatchdogConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sample_config_validates() {
        let config = WatchdogConfig::sample();
        assert!(config.validate().is_ok());
        assert_eq!(config.services.len(), 3);
    }

    #[test]
    fn test_api_defaults_to_localhost() {
        let config = WatchdogConfig::default();
        assert!(config.api_is_localhost_only());
        assert_eq!(config.api.bind_address, IpAddr::V4(Ipv4Addr::LOCALHOST));
    }

    #[test]
    fn test_bind_override_classifies_loopback_spellings() {
        let mut config = WatchdogConfig::default();

        // Loopback in any spelling stays localhost-only.
        config.apply_bind_override("0:0:0:0:0:0:0:1");
        assert!(config.api_is_localhost_only());
        config.apply_bind_override("127.0.0.2");
        assert!(config.api_is_localhost_only());

        config.apply_bind_override("0.0.0.0");
        assert!(!config.api_is_localhost_only());

        // Garbage leaves the previous address in place.
        config.apply_bind_override("not-an-address");
        assert_eq!(config.api.bind_address.to_string(), "0.0.0.0");
    }

    #[test]
    fn test_zero_api_port_rejected() {
        let mut config = WatchdogConfig::default();
        config.api.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_duplicate_service_ids_rejected() {
        let mut config = WatchdogConfig::default();
        config.services.push(managed_service("relay", 9001));
        config.services.push(managed_service("relay", 9002));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_service_port_collision_with_api_rejected() {
        let mut config = WatchdogConfig::default();
        config.services.push(managed_service("relay", config.api.port));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_auto_restart_requires_command() {
        let mut service = managed_service("relay", 9001);
        service.command.clear();
        assert!(service.validate().is_err());

        service.auto_restart = false;
        assert!(service.validate().is_ok());
    }

    #[test]
    fn test_invalid_health_url_rejected() {
        let mut service = managed_service("relay", 9001);
        service.health_url = "not a url".into();
        assert!(service.validate().is_err());
    }

    #[test]
    fn test_probe_timeout_must_fit_in_tick() {
        let mut config = WatchdogConfig::default();
        config.policy.tick_secs = 3;
        config.policy.probe_timeout_secs = 3;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = WatchdogConfig::sample();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: WatchdogConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.services.len(), config.services.len());
        assert_eq!(parsed.services[0].id, "relay");
        assert_eq!(parsed.policy.cooldown_secs, config.policy.cooldown_secs);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[policy]
tick_secs = 10
max_restarts = 5

[[services]]
id = "relay"
name = "Message Relay"
port = 9750
command = ["/usr/bin/relayd"]
health_url = "http://127.0.0.1:9750/health"
auto_restart = true
"#
        )
        .unwrap();

        let config = WatchdogConfig::load(file.path()).unwrap();
        assert_eq!(config.policy.tick_secs, 10);
        assert_eq!(config.policy.max_restarts, 5);
        // untouched sections keep their defaults
        assert_eq!(config.policy.cooldown_secs, DEFAULT_COOLDOWN_SECS);
        assert_eq!(config.services.len(), 1);
        assert!(config.services[0].is_managed());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = WatchdogConfig::load("/nonexistent/meshwatch.toml").unwrap();
        assert!(config.services.is_empty());
        assert_eq!(config.api.port, DEFAULT_API_PORT);
    }
}
