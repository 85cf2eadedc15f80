//! `revo analyze`: sample a repository and print the preview

use crate::app::AppContext;
use anyhow::anyhow;
use revo_core::{AnalysisPayload, RepositoryIdentifier};

/// Execute the analyze command
pub async fn execute(ctx: &AppContext, repo: &str, json: bool) -> anyhow::Result<()> {
    let repo: RepositoryIdentifier = repo.parse()?;
    let (payload, preview) = sample(ctx, &repo).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        ctx.console.print_preview(&preview);
    }
    Ok(())
}

/// Run one sampling pass through the coordinator
pub async fn sample(
    ctx: &AppContext,
    repo: &RepositoryIdentifier,
) -> anyhow::Result<(AnalysisPayload, String)> {
    ctx.console.info(&format!("Sampling {}...", repo));

    let mut coordinator = ctx.coordinator();
    let message = coordinator.run(ctx.request(repo)).await?;
    coordinator.shutdown();

    let (payload, preview) = message.into_result().map_err(|message| anyhow!(message))?;
    ctx.console.info(&format!(
        "Sampled {} file(s) from branch {}",
        payload.files_analyzed, payload.metadata.branch
    ));
    Ok((payload, preview))
}
