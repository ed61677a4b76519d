use anyhow::Result;
use clap::Parser;
use sector_performance::app;
use sector_performance::cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    match Cli::parse().command() {
        Command::Run(args) => app::run(args).await,
        Command::Sector(args) => app::sector(args).await,
        Command::Sectors(args) => app::list_sectors(args),
    }
}
