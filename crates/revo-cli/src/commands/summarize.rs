//! `revo summarize`: sample a repository and print an AI summary

use super::analyze::sample;
use crate::app::AppContext;
use revo_core::{Conversation, HandoffClient, RepositoryIdentifier};

/// Execute the summarize command
pub async fn execute(ctx: &AppContext, repo: &str) -> anyhow::Result<()> {
    let repo: RepositoryIdentifier = repo.parse()?;
    let client = ctx.handoff()?;
    let conversation = start(ctx, &client, &repo).await?;
    ctx.console.print_markdown(conversation.transcript());
    Ok(())
}

/// Sample, show the preview, and hand the payload off
pub async fn start(
    ctx: &AppContext,
    client: &HandoffClient,
    repo: &RepositoryIdentifier,
) -> anyhow::Result<Conversation> {
    let (payload, preview) = sample(ctx, repo).await?;
    ctx.console.print_preview(&preview);

    ctx.console.info("Analyzing with Revo AI...");
    let conversation = Conversation::start(client, payload, &preview).await?;
    ctx.console.print_header(&format!("Summary of {}", repo));
    Ok(conversation)
}
