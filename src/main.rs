//! RAX file service - Entry Point
//!
//! Serves a sandboxed view of one directory tree over newline-delimited JSON.

use log::{error, info};
use std::process;

use rax_fs::Server;
use rax_fs::config::ServerConfig;

#[tokio::main]
async fn main() {
    // Initialize the logger (env_logger picks up RUST_LOG environment variable)
    env_logger::init();

    info!("Launching RAX file service...");

    let config = match ServerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    let server = match Server::new(config).await {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to start server: {}", e);
            process::exit(1);
        }
    };

    server.start().await;
}
