use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use crate::args::Args;
use crate::commands::Command;
use crate::commands::JinjagvCommand;
use crate::logging;

/// The main CLI structure that defines the command-line interface
#[derive(Parser)]
#[command(name = "jinjagv")]
#[command(version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: JinjagvCommand,

    #[command(flatten)]
    pub args: Args,
}

/// Parse CLI arguments and execute the chosen command
pub fn run(argv: Vec<String>) -> Result<ExitCode> {
    let cli = Cli::try_parse_from(argv).unwrap_or_else(|e| {
        e.exit();
    });

    logging::init(&cli.args.global);

    cli.command.execute(&cli.args)
}
