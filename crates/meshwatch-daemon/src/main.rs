mod cli;

use clap::Parser;
use cli::{init_config, init_logging, run_checks, run_supervisor, show_status, Cli, Commands};
use meshwatch_types::MeshResult;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> MeshResult<()> {
    let cli = Cli::parse();

    init_logging(&cli);

    let data_dir = cli.data_dir.clone().unwrap_or_else(|| {
        dirs::home_dir()
            .map(|h| h.join(".meshwatch"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/meshwatch"))
    });

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| data_dir.join("config.toml"));

    match cli.command {
        Commands::Run { pid_file } => {
            run_supervisor(&config_path, &data_dir, pid_file).await?;
        }
        Commands::Init { force } => {
            init_config(&config_path, &data_dir, force)?;
        }
        Commands::Check => {
            run_checks(&config_path, &data_dir)?;
        }
        Commands::Status => {
            show_status(&config_path).await?;
        }
        Commands::Version => {
            println!("meshwatch {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
