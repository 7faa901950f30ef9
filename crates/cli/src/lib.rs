pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "parley",
    about = "Parley operator CLI",
    long_about = "Operate Parley: run the intent extractor locally, inspect effective \
configuration, and check service readiness.",
    after_help = "Examples:\n  parley extract \"Schedule a meeting with Alice next Friday at 3pm\"\n  parley config\n  parley doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Run the intent extractor on a phrase and print the structured payload")]
    Extract {
        #[arg(help = "Free text to extract an intent from")]
        text: String,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config and run engine/extractor readiness checks")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Extract { text } => commands::extract::run(&text),
        Command::Config => commands::config::run(),
        Command::Doctor { json } => commands::doctor::run(json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
