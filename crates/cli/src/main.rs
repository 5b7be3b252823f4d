use std::process::ExitCode;

use cove_core::config::{AppConfig, LoadOptions};
use tracing::Level;

// Logs go to stderr so prompts and command output own stdout.
fn init_logging() {
    let log_level = AppConfig::load(LoadOptions::default())
        .ok()
        .and_then(|config| config.logging.level.parse::<Level>().ok())
        .unwrap_or(Level::WARN);

    tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();
    cove_cli::run().await
}
