//! Command routing logic for CLI

use crate::app::AppContext;
use crate::args::{Cli, Commands};
use crate::commands;

/// Route CLI commands to their respective handlers
pub async fn route(cli: Cli) -> anyhow::Result<()> {
    let ctx = AppContext::from_cli(&cli)?;

    match &cli.command {
        Commands::Analyze { repo, json } => commands::analyze::execute(&ctx, repo, *json).await,
        Commands::Summarize { repo } => commands::summarize::execute(&ctx, repo).await,
        Commands::Chat { repo } => commands::chat::execute(&ctx, repo).await,
        Commands::Worker => commands::worker::execute(&ctx).await,
    }
}
