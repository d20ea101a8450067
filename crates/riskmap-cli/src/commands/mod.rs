//! Command implementations

mod ingest;

use crate::cli::{Cli, Commands};
use anyhow::Result;

/// Execute a CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Ingest(args) => ingest::execute(args, cli.config.as_deref()).await,
    }
}
