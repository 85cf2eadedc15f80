//! Provider response shapes
//!
//! Only the fields the pipeline reads are modelled; everything is optional so
//! that a partial response degrades into an "unusable" result instead of a
//! parse failure.

use crate::types::{FileTreeEntry, RepoMetadata};
use serde::Deserialize;

/// `GET /repos/{owner}/{repo}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RepoResponse {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub stargazers_count: Option<u64>,
    #[serde(default)]
    pub forks_count: Option<u64>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub default_branch: Option<String>,
}

impl RepoResponse {
    /// Project onto the payload metadata; `fallback_name` fills a missing full name
    pub fn into_metadata(self, fallback_name: &str) -> RepoMetadata {
        RepoMetadata {
            name: self
                .full_name
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| fallback_name.to_string()),
            description: self.description,
            stars: self.stargazers_count.unwrap_or(0),
            forks: self.forks_count.unwrap_or(0),
            language: self.language,
            branch: self.default_branch.unwrap_or_default(),
        }
    }
}

/// `GET /repos/{owner}/{repo}/git/trees/{ref}?recursive=1`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TreeResponse {
    #[serde(default)]
    pub tree: Option<Vec<FileTreeEntry>>,
    #[serde(default)]
    pub truncated: bool,
}

/// `GET /repos/{owner}/{repo}/commits/{branch}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommitResponse {
    #[serde(default)]
    pub commit: Option<CommitDetail>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommitDetail {
    #[serde(default)]
    pub tree: Option<TreeRef>,
}

/// Tree reference, either `{ "sha": ... }` or a bare sha string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TreeRef {
    Object { sha: String },
    Sha(String),
}

impl CommitResponse {
    pub fn tree_sha(&self) -> Option<&str> {
        let sha = match self.commit.as_ref()?.tree.as_ref()? {
            TreeRef::Object { sha } => sha,
            TreeRef::Sha(sha) => sha,
        };
        (!sha.is_empty()).then_some(sha.as_str())
    }
}
