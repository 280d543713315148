mod bootstrap_helpers;
mod cli_args;
mod github_output;
mod publish_command;

use anyhow::Result;
use clap::Parser;

use crate::bootstrap_helpers::init_tracing;
use crate::cli_args::Cli;
use crate::publish_command::run_publish;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    run_publish(cli).await
}
