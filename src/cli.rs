use clap::{Parser, Subcommand};

use crate::app::{ListArgs, RunArgs, SectorArgs};

#[derive(Debug, Parser)]
#[command(author, version, about = "JSE sector performance scanner")]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    // options for the implicit `run` when no subcommand is given
    #[command(flatten)]
    run: RunArgs,
}

impl Cli {
    pub fn command(self) -> Command {
        self.command.unwrap_or(Command::Run(self.run))
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Rank every sector and drill into the best and worst
    Run(RunArgs),
    /// Analyse a single sector and chart its tickers
    Sector(SectorArgs),
    /// List the configured sectors and their tickers
    Sectors(ListArgs),
}
