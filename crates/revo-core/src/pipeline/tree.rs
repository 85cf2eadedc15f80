//! Tree resolution: metadata, then tree by branch, then tree by commit sha

use crate::error::{RevoError, RevoResult};
use crate::github::{RepoHost, TreeListing};
use crate::types::{FileTreeEntry, RepoMetadata, RepositoryIdentifier};
use tracing::{debug, warn};

/// Metadata plus the complete tree of the default branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTree {
    pub metadata: RepoMetadata,
    pub entries: Vec<FileTreeEntry>,
}

impl ResolvedTree {
    /// Blob paths in tree order
    pub fn blob_paths(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.is_blob())
            .map(|e| e.path.clone())
            .collect()
    }

    pub fn branch(&self) -> &str {
        &self.metadata.branch
    }
}

/// Resolves the file tree of a repository's default branch
pub struct TreeResolver<'a> {
    host: &'a dyn RepoHost,
}

impl<'a> TreeResolver<'a> {
    pub fn new(host: &'a dyn RepoHost) -> Self {
        Self { host }
    }

    /// Fetch metadata and the recursive tree, falling back from the branch
    /// name to the latest commit's tree sha. Attempts run strictly in sequence.
    pub async fn resolve(&self, repo: &RepositoryIdentifier) -> RevoResult<ResolvedTree> {
        let metadata = match self.host.repository(repo).await {
            Ok(metadata) => metadata,
            Err(err @ RevoError::MetadataUnavailable(_)) => return Err(err),
            Err(err) => return Err(RevoError::metadata(err.to_string())),
        };
        if metadata.branch.trim().is_empty() {
            return Err(RevoError::metadata("repository has no default branch"));
        }
        let branch = metadata.branch.clone();

        let listing = match usable(self.host.tree(repo, &branch).await) {
            Some(listing) => listing,
            None => {
                warn!(%repo, %branch, "tree by branch unavailable, trying commit tree sha");
                self.resolve_by_commit(repo, &branch).await?
            }
        };

        if listing.truncated {
            warn!(%repo, entries = listing.entries.len(), "provider truncated the tree listing");
        }
        debug!(%repo, entries = listing.entries.len(), "tree resolved");

        Ok(ResolvedTree {
            metadata,
            entries: listing.entries,
        })
    }

    async fn resolve_by_commit(
        &self,
        repo: &RepositoryIdentifier,
        branch: &str,
    ) -> RevoResult<TreeListing> {
        let sha = self.host.commit_tree_sha(repo, branch).await.map_err(|e| {
            RevoError::tree(format!("no tree for branch '{}' and no commit tree: {}", branch, e))
        })?;

        usable(self.host.tree(repo, &sha).await).ok_or_else(|| {
            RevoError::tree(format!(
                "no tree for branch '{}' or commit tree {}",
                branch, sha
            ))
        })
    }
}

/// A listing counts only when it arrived and is non-empty
fn usable(result: RevoResult<TreeListing>) -> Option<TreeListing> {
    match result {
        Ok(listing) if !listing.entries.is_empty() => Some(listing),
        Ok(_) => None,
        Err(err) => {
            debug!(error = %err, "tree request failed");
            None
        }
    }
}
