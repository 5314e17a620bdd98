use super::utils::print_banner;
use meshwatch_daemon::{serve, AppState, CancellationToken, Watchdog, WatchdogConfig};
use meshwatch_types::{MeshError, MeshResult};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

pub async fn run_supervisor(
    config_path: &PathBuf,
    data_dir: &PathBuf,
    pid_file: Option<PathBuf>,
) -> MeshResult<()> {
    print_banner();
    info!("Starting meshwatch v{}", env!("CARGO_PKG_VERSION"));
    info!("Data directory: {:?}", data_dir);

    if let Some(ref pid_path) = pid_file {
        let pid = std::process::id();
        std::fs::write(pid_path, pid.to_string())
            .map_err(|e| MeshError::Config(format!("Failed to write PID file: {}", e)))?;
        info!("PID file written: {:?}", pid_path);
    }

    std::fs::create_dir_all(data_dir)
        .map_err(|e| MeshError::Config(format!("Failed to create data directory: {}", e)))?;

    let config = WatchdogConfig::load(config_path)?;
    if !config.api_is_localhost_only() {
        warn!(
            "Control API is bound to {}, which is reachable beyond this host",
            config.api.bind_address
        );
    }

    let watchdog = Arc::new(Watchdog::from_config(&config)?);

    let started = watchdog.start_all().await;
    info!(
        "Supervising {} service(s), {} launched at startup",
        config.services.len(),
        started.len()
    );

    let (shutdown_tx, cancel) = CancellationToken::new();
    let shutdown_tx = Arc::new(shutdown_tx);

    let loop_handle = tokio::spawn(watchdog.clone().run_loop(cancel.clone()));

    let api_addr = config.api_addr();
    let api_state = AppState {
        watchdog: watchdog.clone(),
        shutdown: shutdown_tx.clone(),
    };
    let api_config = config.api.clone();
    let api_cancel = cancel.clone();
    let api_handle = tokio::spawn(async move {
        if let Err(e) = serve(api_addr, api_state, &api_config, api_cancel).await {
            error!("Control API error: {}", e);
        }
    });

    print_ready_message(api_addr, config.services.len());

    wait_for_shutdown(cancel.clone()).await;

    info!("Shutting down...");
    let _ = shutdown_tx.send(true);
    let _ = loop_handle.await;
    let _ = api_handle.await;
    watchdog.stop_all_processes().await;

    if let Some(ref pid_path) = pid_file {
        let _ = std::fs::remove_file(pid_path);
    }

    info!("Shutdown complete");
    Ok(())
}

fn print_ready_message(api_addr: SocketAddr, service_count: usize) {
    println!();
    println!("\x1b[38;5;39m  Meshwatch is running.\x1b[0m");
    println!("    Control API:  \x1b[38;5;51mhttp://{}\x1b[0m", api_addr);
    println!("    Services:     {}", service_count);
    println!("    \x1b[38;5;245mPress Ctrl+C to stop\x1b[0m");
    println!();
}

async fn wait_for_shutdown(mut cancel: CancellationToken) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm =
            signal(SignalKind::terminate()).expect("Failed to install SIGTERM handler");
        let mut sigint = signal(SignalKind::interrupt()).expect("Failed to install SIGINT handler");

        tokio::select! {
            _ = sigterm.recv() => { info!("Received SIGTERM"); }
            _ = sigint.recv() => { info!("Received SIGINT"); }
            _ = cancel.cancelled() => { info!("Shutdown requested via control API"); }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::select! {
            r = tokio::signal::ctrl_c() => {
                r.expect("Failed to install Ctrl+C handler");
                info!("Received Ctrl+C");
            }
            _ = cancel.cancelled() => { info!("Shutdown requested via control API"); }
        }
    }
}
