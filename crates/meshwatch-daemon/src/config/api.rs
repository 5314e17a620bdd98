use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};

use super::constants::DEFAULT_API_PORT;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub bind_address: IpAddr,
    pub port: u16,
    pub cors_enabled: bool,
    pub cors_origins: Vec<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_API_PORT,
            cors_enabled: true,
            cors_origins: vec![],
        }
    }
}
