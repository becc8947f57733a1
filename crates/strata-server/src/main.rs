//! strata server binary.
//!
//! Loads `config.ron` (creating it on first run), applies CLI overrides,
//! opens the world and runs the maintenance loop until Ctrl-C. Edits to the
//! config file are picked up on each sort sweep. On shutdown
//! every dirty chunk and the level file are written back.
//!
//! Run with `cargo run -p strata-server -- --world ./world --seed 42`.

mod server;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use strata_config::{CliArgs, Config, default_config_dir};

use crate::server::Server;

fn main() -> ExitCode {
    let args = CliArgs::parse();
    let config_dir = args.config.clone().unwrap_or_else(default_config_dir);

    let on_disk = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    let mut config = on_disk.clone();
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    strata_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    match run(&config, config_dir, on_disk, args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(
    config: &Config,
    config_dir: PathBuf,
    on_disk: Config,
    args: CliArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let running = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&running);
    ctrlc::set_handler(move || flag.store(false, Ordering::SeqCst))?;

    let mut server = Server::open(config)?;
    server.watch_config(config_dir, on_disk, args);
    tracing::info!(
        world = %config.world.directory.display(),
        seed = server.world().seed(),
        "world opened"
    );

    while running.load(Ordering::SeqCst) {
        server.tick();
        std::thread::sleep(server.tick_interval());
    }

    tracing::info!("shutting down");
    server.shutdown()?;
    Ok(())
}
