//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::commands::fetch::FetchArgs;
use super::commands::posts::PostsArgs;

/// Command-line interface.
#[derive(Parser, Debug)]
#[command(name = "resource-loader")]
#[command(about = "Fetch JSON resources through a deduplicating, cancellable cache", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to run
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Load configuration from this file instead of .resource-loader/
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch a JSON resource by URL
    Fetch(FetchArgs),

    /// Render the post list
    Posts(PostsArgs),
}
