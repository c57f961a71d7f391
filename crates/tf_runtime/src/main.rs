//! TF Inventory Runtime
//!
//! Loads the item manifest and inventory layout, then replays a scripted
//! session against a freshly spawned character.
//!
//! Run with: cargo run -p tf_runtime
//!       or: TF_CONFIG_DIR=path/to/config cargo run --bin tfinv

mod config;
mod session;

use std::sync::Arc;

use config::RuntimeConfig;

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).init();

    println!();
    println!("TF Inventory v{}", env!("CARGO_PKG_VERSION"));
    println!();

    let config = match RuntimeConfig::load() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    config.print_summary();

    // A broken or duplicated item id leaves the registry unusable
    let registry = match config.build_registry() {
        Ok(registry) => Arc::new(registry),
        Err(e) => {
            log::error!("Item registry initialization failed: {}", e);
            std::process::exit(1);
        }
    };

    match session::run(registry, &config.inventory, &config.session) {
        Ok(report) => {
            log::info!(
                "Session finished: picked up {}, looted {}, {} commands ok, {} refused, {} left in world",
                report.picked_up,
                report.looted,
                report.commands_ok,
                report.commands_refused,
                report.left_in_world
            );
            log::info!(
                "Final version {}, snapshot {} bytes",
                report.version,
                report.snapshot_bytes
            );
        }
        Err(e) => {
            log::error!("Session failed: {}", e);
            std::process::exit(1);
        }
    }
}
