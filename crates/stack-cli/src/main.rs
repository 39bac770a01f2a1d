//! Command-line entry point: run a dependency stack analysis from the terminal.

mod cli;
mod console;

use std::process::ExitCode;

use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = cli::Cli::parse();
    stack_core::tracing_setup::init_tracing(cli.json_logs);
    cli.run().await
}
