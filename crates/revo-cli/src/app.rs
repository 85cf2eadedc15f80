//! Per-invocation application context

use crate::args::Cli;
use crate::console::CliConsole;
use anyhow::Context;
use revo_core::{
    AnalysisRequest, ExecutionCoordinator, ExecutionMode, GitHubConnector, HandoffClient,
    RepositoryIdentifier, RevoConfig, load_config,
};
use std::sync::Arc;

/// Resolved configuration plus the flags every command needs
pub struct AppContext {
    pub config: RevoConfig,
    pub mode: ExecutionMode,
    pub console: CliConsole,
}

impl AppContext {
    /// Load configuration (file, then environment) and apply the CLI flags on top
    pub fn from_cli(cli: &Cli) -> anyhow::Result<Self> {
        let mut config =
            load_config(cli.config.as_deref()).context("Failed to load configuration")?;

        if let Some(token) = cli.token.as_deref().filter(|t| !t.trim().is_empty()) {
            config.github.token = Some(token.trim().to_string());
        }
        if let Some(limit) = cli.limit {
            config.sampling.sample_limit = limit;
        }
        if let Some(snippet) = cli.snippet {
            config.sampling.max_snippet_length = snippet;
        }
        if let Some(concurrency) = cli.concurrency {
            config.sampling.concurrency = concurrency;
        }
        config.sampling = config.sampling.clamped();

        let mode = if cli.inline {
            ExecutionMode::Inline
        } else {
            ExecutionMode::Background
        };

        Ok(Self {
            config,
            mode,
            console: CliConsole::new(cli.verbose),
        })
    }

    /// Coordinator for this invocation
    pub fn coordinator(&self) -> ExecutionCoordinator {
        let connector = Arc::new(GitHubConnector::new(self.config.github.clone()));
        let coordinator = ExecutionCoordinator::from_config(&self.config, connector, self.mode);
        if coordinator.mode() != self.mode {
            self.console
                .warn("Background worker unavailable, sampling on the main runtime");
        }
        coordinator
    }

    pub fn handoff(&self) -> anyhow::Result<HandoffClient> {
        HandoffClient::new(&self.config.handoff).context("Failed to create handoff client")
    }

    pub fn request(&self, repo: &RepositoryIdentifier) -> AnalysisRequest {
        AnalysisRequest::new(repo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "revo",
            "--config",
            "/nonexistent/revo-test.toml",
            "--token",
            "ghp_flag",
            "--limit",
            "0",
            "--concurrency",
            "8",
            "--inline",
            "analyze",
            "acme/widget",
        ])
        .unwrap();

        let ctx = AppContext::from_cli(&cli).unwrap();
        assert_eq!(ctx.config.github.token.as_deref(), Some("ghp_flag"));
        assert_eq!(ctx.config.sampling.sample_limit, 1);
        assert_eq!(ctx.config.sampling.concurrency, 8);
        assert_eq!(ctx.mode, ExecutionMode::Inline);
    }
}
