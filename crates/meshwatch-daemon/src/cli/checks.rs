use meshwatch_daemon::WatchdogConfig;
use meshwatch_types::MeshResult;
use std::io::Write;
use std::path::PathBuf;

pub fn run_checks(config_path: &PathBuf, data_dir: &PathBuf) -> MeshResult<()> {
    println!("\x1b[38;5;39mMeshwatch Diagnostics\x1b[0m");
    println!("\x1b[38;5;245m{}\x1b[0m", "═".repeat(50));
    println!();

    let mut passed = 0;
    let mut failed = 0;
    let mut warnings = 0;

    print!("[1/3] Configuration:   ");
    let _ = std::io::stdout().flush();
    let config = if config_path.exists() {
        match WatchdogConfig::load(config_path) {
            Ok(config) => {
                println!("\x1b[38;5;39mOK\x1b[0m");
                passed += 1;
                Some(config)
            }
            Err(e) => {
                println!("\x1b[38;5;196mFAIL\x1b[0m - {}", e);
                failed += 1;
                None
            }
        }
    } else {
        println!("\x1b[38;5;226mWARN\x1b[0m - Not found, defaults apply");
        warnings += 1;
        Some(WatchdogConfig::default())
    };

    print!("[2/3] Data Directory:  ");
    let _ = std::io::stdout().flush();
    if data_dir.is_dir() {
        println!("\x1b[38;5;39mOK\x1b[0m");
        passed += 1;
    } else if data_dir.exists() {
        println!("\x1b[38;5;196mFAIL\x1b[0m - Not a directory");
        failed += 1;
    } else {
        println!("\x1b[38;5;226mWARN\x1b[0m - Will be created on start");
        warnings += 1;
    }

    print!("[3/3] Registry:        ");
    let _ = std::io::stdout().flush();
    match config {
        Some(ref config) if config.services.is_empty() => {
            println!("\x1b[38;5;226mWARN\x1b[0m - No services registered");
            warnings += 1;
        }
        Some(ref config) => {
            let managed = config.services.iter().filter(|s| s.is_managed()).count();
            println!(
                "\x1b[38;5;39mOK\x1b[0m ({} service(s), {} managed)",
                config.services.len(),
                managed
            );
            passed += 1;
        }
        None => {
            println!("\x1b[38;5;245mSKIP\x1b[0m - Configuration failed to load");
        }
    }

    if let Some(ref config) = config {
        println!();
        for service in &config.services {
            let mode = if !service.is_managed() {
                "passive"
            } else if service.auto_restart {
                "managed"
            } else {
                "manual"
            };
            println!(
                "  {:<16} {:<8} {}",
                service.id, mode, service.health_url
            );
        }
    }

    println!();
    println!(
        "Summary: \x1b[38;5;39m{} passed\x1b[0m, \x1b[38;5;196m{} failed\x1b[0m, \x1b[38;5;226m{} warning(s)\x1b[0m",
        passed, failed, warnings
    );

    Ok(())
}
