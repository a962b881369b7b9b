use std::process::ExitCode;

use anyhow::Context;
use anyhow::Result;
use camino::Utf8PathBuf;
use clap::Parser;
use jinjagv_graph::digraph;
use jinjagv_graph::digraph_basic;
use jinjagv_graph::DirLoader;
use jinjagv_graph::Environment;

use crate::args::Args;
use crate::commands::Command;

#[derive(Debug, Parser)]
pub struct Graph {
    /// Directory containing the templates to analyze.
    dir: Utf8PathBuf,

    /// Render declarations and edges only, no node details.
    #[arg(long)]
    basic: bool,

    /// Only analyze templates whose name ends with this suffix.
    #[arg(long, default_value = "")]
    suffix: String,
}

impl Command for Graph {
    fn execute(&self, _args: &Args) -> Result<ExitCode> {
        if !self.dir.is_dir() {
            anyhow::bail!("{} is not a directory", self.dir);
        }

        let env = Environment::new(Box::new(DirLoader::new(self.dir.clone())));

        let output = if self.basic {
            digraph_basic(&env, &self.suffix)
        } else {
            digraph(&env, &self.suffix)
        }
        .context("Failed to render digraph")?;

        print!("{output}");
        Ok(ExitCode::SUCCESS)
    }
}
