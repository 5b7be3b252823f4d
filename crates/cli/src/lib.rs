pub mod client;
pub mod commands;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "cove",
    about = "Cove waitlist CLI",
    long_about = "Join the Cove waitlist from a terminal and inspect the effective configuration.",
    after_help = "Examples:\n  cove join\n  cove config"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Fill in the waitlist form and submit it to the configured endpoint")]
    Join,
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
}

pub async fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Join => commands::join::run().await,
        Command::Config => commands::CommandResult::text(commands::config::run()),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
