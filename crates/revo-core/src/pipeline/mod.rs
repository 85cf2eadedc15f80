//! Repository sampling pipeline
//!
//! A run resolves the tree of the default branch, ranks and selects the
//! files worth reading, fetches and redacts them, and assembles the payload.

pub mod assembler;
pub mod fetcher;
pub mod redact;
pub mod scoring;
pub mod tree;

pub use assembler::{assemble, render_preview};
pub use fetcher::{ContentFetcher, FetchReport, Schedule};
pub use redact::{SENSITIVE_PLACEHOLDER, is_sensitive_path, redact_secrets};
pub use scoring::{EXCLUDED_SCORE, RelevanceScorer, ScoringTable, Selection, WeightedPattern};
pub use tree::{ResolvedTree, TreeResolver};

use crate::config::SamplingConfig;
use crate::error::{RevoError, RevoResult};
use crate::github::RepoHost;
use crate::types::{AnalysisPayload, RepositoryIdentifier, RunStats};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

/// Everything one successful run produces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutput {
    pub payload: AnalysisPayload,
    pub preview: String,
    pub stats: RunStats,
}

/// Runs the four stages against one provider
pub struct SamplingPipeline {
    host: Arc<dyn RepoHost>,
    scorer: RelevanceScorer,
    limits: SamplingConfig,
}

impl SamplingPipeline {
    pub fn new(host: Arc<dyn RepoHost>, scorer: RelevanceScorer, limits: SamplingConfig) -> Self {
        Self {
            host,
            scorer,
            limits: limits.clamped(),
        }
    }

    pub fn limits(&self) -> &SamplingConfig {
        &self.limits
    }

    /// Sample one repository
    ///
    /// Fails with a terminal error when metadata or the tree cannot be
    /// resolved, or with [`RevoError::Cancelled`] once `cancel` fires. Files
    /// that cannot be fetched only shrink the sample set.
    #[instrument(skip(self, repo, schedule, cancel), fields(repo = %repo))]
    pub async fn run(
        &self,
        repo: &RepositoryIdentifier,
        schedule: Schedule,
        cancel: &CancellationToken,
    ) -> RevoResult<PipelineOutput> {
        let started = Instant::now();
        info!("sampling started");

        let resolver = TreeResolver::new(self.host.as_ref());
        let resolved = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(RevoError::Cancelled),
            resolved = resolver.resolve(repo) => resolved?,
        };

        let blobs = resolved.blob_paths();
        let selection = self.scorer.select(&blobs, self.limits.sample_limit);
        if selection.used_fallback {
            warn!(
                candidates = selection.paths.len(),
                "no path scored positively, using extension fallback"
            );
        }

        let report = ContentFetcher::new(self.host.as_ref(), repo, resolved.branch())
            .with_concurrency(self.limits.concurrency)
            .with_max_snippet_length(self.limits.max_snippet_length)
            .with_cancellation(cancel.clone())
            .fetch(&selection.paths, schedule)
            .await?;

        let stats = RunStats {
            tree_size: blobs.len(),
            selected: selection.paths.len(),
            dropped: report.dropped,
        };
        let payload = assemble(repo, resolved.metadata, report.samples);
        let preview = render_preview(&payload);

        info!(
            tree_size = stats.tree_size,
            selected = stats.selected,
            dropped = stats.dropped,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "sampling finished"
        );

        Ok(PipelineOutput {
            payload,
            preview,
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::StaticHost;
    use std::time::Duration;

    fn repo() -> RepositoryIdentifier {
        RepositoryIdentifier::new("acme", "widget").unwrap()
    }

    fn pipeline(host: StaticHost, limits: SamplingConfig) -> SamplingPipeline {
        SamplingPipeline::new(Arc::new(host), RelevanceScorer::default(), limits)
    }

    #[tokio::test]
    async fn test_scenario_run() {
        let host = StaticHost::new()
            .with_file("README.md", "# Widget\napi_key = sk-live-123")
            .with_file("package.json", "{\"name\":\"widget\"}")
            .with_file("src/index.js", "export default 1;")
            .with_file("image.png", "binary");

        let output = pipeline(host, SamplingConfig::default())
            .run(&repo(), Schedule::Pooled, &CancellationToken::new())
            .await
            .unwrap();

        let paths: Vec<&str> = output.payload.samples.iter().map(|s| s.path.as_str()).collect();
        assert_eq!(paths, vec!["src/index.js", "README.md", "package.json"]);
        assert_eq!(output.payload.files_analyzed, 3);
        assert!(!output.payload.samples[1].snippet.contains("sk-live-123"));
        assert_eq!(
            output.stats,
            RunStats {
                tree_size: 4,
                selected: 3,
                dropped: 0
            }
        );
        assert!(output.preview.contains("🗂️ Files analyzed: 3"));
    }

    #[tokio::test]
    async fn test_all_fetches_fail() {
        let host = StaticHost::new()
            .with_unreadable("README.md")
            .with_unreadable("src/main.rs");

        let output = pipeline(host, SamplingConfig::default())
            .run(&repo(), Schedule::Pooled, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(output.payload.files_analyzed, 0);
        assert!(output.payload.samples.is_empty());
        assert_eq!(output.stats.dropped, 2);
        assert!(output.preview.contains("🗂️ Files analyzed: 0"));
    }

    #[tokio::test]
    async fn test_sample_limit_caps_selection() {
        let mut host = StaticHost::new();
        for i in 0..30 {
            host = host.with_file(&format!("src/mod{}.rs", i), "fn f() {}");
        }
        let limits = SamplingConfig {
            sample_limit: 5,
            ..Default::default()
        };

        let output = pipeline(host, limits)
            .run(&repo(), Schedule::cooperative(2, Duration::ZERO), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(output.payload.files_analyzed, 5);
        assert_eq!(output.stats.tree_size, 30);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = pipeline(StaticHost::new().with_file("README.md", "x"), SamplingConfig::default())
            .run(&repo(), Schedule::Pooled, &cancel)
            .await;
        assert!(matches!(result, Err(RevoError::Cancelled)));
    }
}
