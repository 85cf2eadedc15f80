//! Code-hosting provider access
//!
//! The pipeline talks to the provider only through [`RepoHost`], so runs can be
//! driven by the real REST client or by a test double.

pub mod client;
pub mod wire;

pub use client::GitHubClient;

use crate::config::GitHubConfig;
use crate::error::RevoResult;
use crate::types::{FileTreeEntry, RepoMetadata, RepositoryIdentifier};
use async_trait::async_trait;
use std::sync::Arc;

/// Versioned media type sent with every request
pub const ACCEPT_V3: &str = "application/vnd.github.v3+json";

/// A recursive tree listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeListing {
    pub entries: Vec<FileTreeEntry>,
    /// The provider cut the listing short
    pub truncated: bool,
}

/// Read-only operations the sampling pipeline needs from a provider
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RepoHost: Send + Sync {
    /// Repository metadata, including the default branch
    async fn repository(&self, repo: &RepositoryIdentifier) -> RevoResult<RepoMetadata>;

    /// Recursive tree by branch name or tree sha
    async fn tree(&self, repo: &RepositoryIdentifier, reference: &str) -> RevoResult<TreeListing>;

    /// Tree sha of the latest commit on a branch
    async fn commit_tree_sha(&self, repo: &RepositoryIdentifier, branch: &str)
    -> RevoResult<String>;

    /// Raw contents of one file on a branch, reading at most `max_bytes`
    async fn raw_file(
        &self,
        repo: &RepositoryIdentifier,
        branch: &str,
        path: &str,
        max_bytes: usize,
    ) -> RevoResult<String>;
}

/// Builds a host for one run
///
/// Runs may carry their own token, and the background worker builds its
/// client on its own runtime, so hosts are created per run from plain settings.
pub trait HostConnector: Send + Sync {
    fn connect(&self, token: Option<&str>) -> RevoResult<Arc<dyn RepoHost>>;
}

/// Connector producing [`GitHubClient`]s
#[derive(Debug, Clone, Default)]
pub struct GitHubConnector {
    config: GitHubConfig,
}

impl GitHubConnector {
    pub fn new(config: GitHubConfig) -> Self {
        Self { config }
    }
}

impl HostConnector for GitHubConnector {
    fn connect(&self, token: Option<&str>) -> RevoResult<Arc<dyn RepoHost>> {
        let client = GitHubClient::new(self.config.with_token(token))?;
        Ok(Arc::new(client))
    }
}
