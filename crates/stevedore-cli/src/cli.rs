//! Main CLI entry point and command routing
//!
//! Parses arguments, routes to the matching command handler, and returns
//! the process exit code for `main` to report.

use anyhow::Result;
use clap::Parser;

use crate::args::{Commands, StevedoreArgs};
use crate::commands::{run::RunCommand, validate::ValidateCommand, CommandHandler, CommandResult};

/// Main CLI entry point. Returns the exit code: 0 for a completed run,
/// 1 for module failure, 2 for configuration failure, 124 for cancellation.
pub async fn run() -> Result<i32> {
    let args = StevedoreArgs::parse();

    let result = match args.command {
        Commands::Run {
            config,
            halt_on_error,
            timeout,
            branch,
            source_root,
            json,
            no_strict_secrets,
        } => {
            let handler = RunCommand {
                config,
                halt_on_error,
                timeout,
                branch,
                source_root,
                json,
                no_strict_secrets,
            };
            handler.execute().await?
        }
        Commands::Validate { config } => {
            let handler = ValidateCommand { config };
            handler.execute().await?
        }
    };

    report_outcome(&result);
    Ok(result.exit_code)
}

fn report_outcome(result: &CommandResult) {
    if let Some(message) = &result.message {
        if result.exit_code == 0 {
            println!("{}", message);
        } else {
            eprintln!("Error: {}", message);
        }
    }
}
