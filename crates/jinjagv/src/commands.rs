mod graph;

use std::process::ExitCode;

use anyhow::Result;
use clap::Subcommand;

use crate::args::Args;

pub trait Command {
    fn execute(&self, args: &Args) -> Result<ExitCode>;
}

#[derive(Debug, Subcommand)]
pub enum JinjagvCommand {
    /// Render a Graphviz digraph of a template directory
    Graph(self::graph::Graph),
}

impl Command for JinjagvCommand {
    fn execute(&self, args: &Args) -> Result<ExitCode> {
        match self {
            Self::Graph(cmd) => cmd.execute(args),
        }
    }
}
