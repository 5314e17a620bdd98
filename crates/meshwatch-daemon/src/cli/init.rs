use meshwatch_daemon::WatchdogConfig;
use meshwatch_types::{MeshError, MeshResult};
use std::path::PathBuf;

pub fn init_config(config_path: &PathBuf, data_dir: &PathBuf, force: bool) -> MeshResult<()> {
    println!("\x1b[38;5;39mInitializing meshwatch...\x1b[0m");
    println!();

    if config_path.exists() && !force {
        println!(
            "\x1b[38;5;226mConfiguration already exists at {:?}\x1b[0m",
            config_path
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    std::fs::create_dir_all(data_dir)
        .map_err(|e| MeshError::Config(format!("Failed to create data directory: {}", e)))?;

    let mut config = WatchdogConfig::sample();
    config.data_dir = data_dir.clone();
    config.save(config_path)?;

    println!("\x1b[38;5;39m[+]\x1b[0m Wrote starter configuration");
    println!("    Config: {:?}", config_path);
    println!("    Data:   {:?}", data_dir);
    println!();
    println!("Next steps:");
    println!("  1. Edit the [[services]] entries to match your mesh");
    println!("  2. Start the supervisor: \x1b[38;5;51mmeshwatch run\x1b[0m");

    Ok(())
}
