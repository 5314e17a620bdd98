use meshwatch_daemon::WatchdogConfig;
use meshwatch_types::{MeshError, MeshResult};
use std::path::PathBuf;
use std::time::Duration;

/// Query a running supervisor over its control API and print a summary.
pub async fn show_status(config_path: &PathBuf) -> MeshResult<()> {
    let config = WatchdogConfig::load(config_path)?;
    let url = format!("http://{}/status", config.api_addr());

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(3))
        .build()
        .map_err(|e| MeshError::Network(format!("Failed to build HTTP client: {}", e)))?;

    let response = client.get(&url).send().await.map_err(|_| {
        MeshError::Network(format!(
            "No supervisor reachable at {} (is meshwatch running?)",
            config.api_addr()
        ))
    })?;

    let body: serde_json::Value = response
        .json()
        .await
        .map_err(|e| MeshError::Serialization(format!("Unexpected status payload: {}", e)))?;

    let stats = &body["stats"];
    println!("\x1b[38;5;39mMeshwatch Status\x1b[0m");
    println!(
        "  Uptime:    {}s",
        stats["uptime_secs"].as_u64().unwrap_or(0)
    );
    println!(
        "  Services:  {} total / {} healthy / {} degraded / {} unreachable",
        stats["total_services"].as_u64().unwrap_or(0),
        stats["healthy"].as_u64().unwrap_or(0),
        stats["degraded"].as_u64().unwrap_or(0),
        stats["unreachable"].as_u64().unwrap_or(0),
    );
    println!(
        "  Restarts:  {} issued, {} alert(s) dispatched",
        stats["total_restarts"].as_u64().unwrap_or(0),
        stats["total_alerts"].as_u64().unwrap_or(0),
    );
    println!();

    if let Some(services) = body["services"].as_array() {
        for service in services {
            let health = service["health"].as_str().unwrap_or("unknown");
            let color = match health {
                "healthy" => "\x1b[38;5;39m",
                "degraded" => "\x1b[38;5;226m",
                "unreachable" => "\x1b[38;5;196m",
                _ => "\x1b[38;5;245m",
            };
            println!(
                "  {:<16} {}{:<12}\x1b[0m {:<12} restarts: {}",
                service["id"].as_str().unwrap_or("?"),
                color,
                health,
                service["phase"].as_str().unwrap_or("?"),
                service["restart_count"].as_u64().unwrap_or(0),
            );
        }
    }

    Ok(())
}
