//! `revo chat`: summary followed by a follow-up question loop

use super::summarize::start;
use crate::app::AppContext;
use dialoguer::{Input, theme::ColorfulTheme};
use revo_core::RepositoryIdentifier;

const EXIT_WORDS: [&str; 3] = ["exit", "quit", ":q"];

/// Execute the chat command
pub async fn execute(ctx: &AppContext, repo: &str) -> anyhow::Result<()> {
    let repo: RepositoryIdentifier = repo.parse()?;
    let client = ctx.handoff()?;
    let mut conversation = start(ctx, &client, &repo).await?;
    ctx.console.print_markdown(conversation.transcript());

    let theme = ColorfulTheme::default();
    loop {
        let question: String = Input::with_theme(&theme)
            .with_prompt("Ask Revo (empty line to quit)")
            .allow_empty(true)
            .interact_text()?;
        let question = question.trim();
        if question.is_empty() || EXIT_WORDS.contains(&question) {
            break;
        }

        match conversation.ask(&client, question).await {
            Ok(answer) => ctx.console.print_answer(&answer),
            Err(err) => ctx.console.warn(&format!("Ask Revo failed: {}", err)),
        }
    }

    ctx.console.success("Session ended");
    Ok(())
}
