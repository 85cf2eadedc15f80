//! `revo worker`: line-delimited JSON protocol on stdin/stdout
//!
//! Each input line is an [`AnalysisRequest`]; each run answers with exactly one
//! [`PipelineMessage`] line. A new request supersedes the one still running,
//! whose result is then never written.

use crate::app::AppContext;
use revo_core::{AnalysisRequest, PipelineMessage};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

/// Execute the worker command
pub async fn execute(ctx: &AppContext) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut coordinator = ctx.coordinator();
    let mut pending = false;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match AnalysisRequest::from_json(&line).and_then(|request| coordinator.submit(request)) {
                    Ok(ticket) => {
                        debug!(run = ticket.id, repo = %ticket.repo, "request accepted");
                        pending = true;
                    }
                    Err(err) => emit(&PipelineMessage::from(&err))?,
                }
            }
            event = coordinator.recv(), if pending => {
                if let Some(event) = event {
                    pending = false;
                    emit(&event.message)?;
                }
            }
        }
    }

    // Input closed: finish the run still in flight
    if pending {
        if let Some(event) = coordinator.recv().await {
            emit(&event.message)?;
        }
    }
    coordinator.shutdown();
    Ok(())
}

fn emit(message: &PipelineMessage) -> anyhow::Result<()> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", message.to_json()?)?;
    stdout.flush()?;
    Ok(())
}
