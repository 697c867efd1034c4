//! credstore - Entry Point
//!
//! Serves credential and permission checks over a line protocol.

use credstore::config::AppConfig;
use credstore::server;
use credstore::utils::setup_logging;
use log::{error, info};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    setup_logging(&config.log_level);

    info!("Launching credstore...");

    match server::run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
