mod cli;
mod client;
mod config;
mod download;
mod error;
mod lookup;
mod registry;
mod resolve;

use anyhow::{Error, Result};
use clap::Parser;
use cli::{command, Cli, Commands};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "airnow=info" } else { "airnow=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .init();

    match cli.command {
        Commands::Scrape(args) => {
            let directory = command::scrape(args, cli.verbose).await?;
            println!("Files saved to `{}`", directory);
        }
        Commands::Merge {
            input_directory,
            output_directory,
        } => {
            let (sites, data) = command::merge(&input_directory, &output_directory, cli.verbose).await?;
            println!("Files saved to `{}` and `{}`", sites.display(), data.display());
        }
    }

    Ok(())
}
