use clap::{Parser, Subcommand};
use std::path::PathBuf;

const BUILD_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "meshwatch")]
#[command(version = BUILD_VERSION)]
#[command(about = "Meshwatch - service supervisor for the home mesh")]
#[command(long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[arg(short, long, global = true, value_name = "FILE", help = "Path to config file")]
    pub config: Option<PathBuf>,

    #[arg(short = 'd', long, global = true, value_name = "DIR", env = "MESHWATCH_DATA_DIR", help = "Data directory path")]
    pub data_dir: Option<PathBuf>,

    #[arg(short, long, action = clap::ArgAction::Count, global = true, help = "Increase verbosity (-v, -vv, -vvv)")]
    pub verbose: u8,

    #[arg(short, long, global = true, help = "Suppress non-error output")]
    pub quiet: bool,

    #[arg(long, global = true, value_name = "FILE", help = "Write logs to file")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Start the supervisor")]
    #[command(long_about = "Start the meshwatch supervisor.\n\nLaunches every managed service, probes health endpoints on a fixed interval, and restarts services within the configured budget.")]
    Run {
        #[arg(long, value_name = "FILE", help = "Write PID to file")]
        pid_file: Option<PathBuf>,
    },

    #[command(about = "Write a starter configuration")]
    Init {
        #[arg(short, long, help = "Overwrite existing configuration")]
        force: bool,
    },

    #[command(about = "Validate configuration and list the registry")]
    Check,

    #[command(about = "Query a running supervisor for its status")]
    Status,

    #[command(about = "Show version information")]
    Version,
}
