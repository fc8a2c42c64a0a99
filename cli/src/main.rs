mod commands;
mod config;
mod error;
mod functions;
mod keypress;
mod logger;
mod queue;
mod runner;
mod topic;
mod version;
mod writer;
use crate::commands::Commands;
use crate::error::Error;
use crate::logger::Logger;
use crate::runner::{Runnable, Runner};
use clap::Parser;
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "cloudtail",
    version,
    about = "Operational visibility for AWS Lambda, SNS and SQS",
    long_about = "List Lambda functions across regions with the time they were used last, and live-tail messages going into SNS topics and SQS queues."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Derive a runner from the command and run it
async fn run(command: impl Runnable) -> Result<(), Error> {
    command.runner().run().await
}

#[tokio::main]
async fn main() -> ExitCode {
    Logger::init();
    let cli = Cli::parse();

    version::check().await;

    // Match all commands here, in one place
    let result = match cli.command {
        Commands::ListFunctions(cmd) => run(cmd).await,
        Commands::TailTopic(cmd) => run(cmd).await,
        Commands::TailQueue(cmd) => run(cmd).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            log::debug!("Command failed, {:?} error", error.kind());
            eprintln!("\n{}\n{error}", console::style("Error").red().bold());
            ExitCode::FAILURE
        }
    }
}
