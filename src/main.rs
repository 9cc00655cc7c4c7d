//! Resource Loader CLI entry point.

use anyhow::Result;
use clap::Parser;

use resource_loader::cli::{commands, Cli, Commands};
use resource_loader::infrastructure::logging::{LogConfig, LoggerImpl};
use resource_loader::ConfigLoader;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json = cli.json;

    if let Err(err) = run(cli).await {
        resource_loader::cli::handle_error(err, json);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = match cli.config {
        Some(ref path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };
    let _logger = LoggerImpl::init(&LogConfig::from(&config.logging))?;

    match cli.command {
        Commands::Fetch(args) => commands::fetch::execute(args, &config, cli.json).await,
        Commands::Posts(args) => commands::posts::execute(args, &config, cli.json).await,
    }
}
