//! Core data model shared by every pipeline stage

use crate::error::{RevoError, RevoResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Owner/name pair identifying one repository on the hosting provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryIdentifier {
    pub owner: String,
    pub name: String,
}

impl RepositoryIdentifier {
    /// Create a new identifier, rejecting empty components
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> RevoResult<Self> {
        let owner = owner.into().trim().to_string();
        let name = name.into().trim().to_string();
        if owner.is_empty() || name.is_empty() {
            return Err(RevoError::invalid_input("Missing owner or repo"));
        }
        Ok(Self { owner, name })
    }

    /// `owner/name` form used in payloads and logs
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl fmt::Display for RepositoryIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepositoryIdentifier {
    type Err = RevoError;

    /// Accepts `owner/name` or a repository page URL such as
    /// `https://github.com/owner/name/tree/main/src`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let rest = match trimmed.find("://") {
            Some(idx) => {
                let after_scheme = &trimmed[idx + 3..];
                match after_scheme.find('/') {
                    Some(slash) => &after_scheme[slash + 1..],
                    None => "",
                }
            }
            None => trimmed,
        };

        let mut parts = rest.split('/').filter(|p| !p.is_empty());
        let owner = parts.next().unwrap_or_default();
        let name = parts
            .next()
            .unwrap_or_default()
            .trim_end_matches(".git");
        Self::new(owner, name)
    }
}

/// Kind of a tree entry as reported by the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Blob,
    Tree,
    /// Submodules and anything else the provider may add
    #[serde(other)]
    Other,
}

/// One entry of a recursive tree listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTreeEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

impl FileTreeEntry {
    pub fn blob(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Blob,
        }
    }

    pub fn tree(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Tree,
        }
    }

    pub fn is_blob(&self) -> bool {
        self.kind == EntryKind::Blob
    }
}

/// A path with its relevance score
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredFile {
    pub path: String,
    pub score: i32,
}

/// A truncated, redacted excerpt of one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSample {
    pub path: String,
    pub snippet: String,
}

/// Descriptive fields projected from the provider's repository resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoMetadata {
    /// Full `owner/name` as reported by the provider
    pub name: String,
    pub description: Option<String>,
    pub stars: u64,
    pub forks: u64,
    pub language: Option<String>,
    /// Default branch the run sampled from
    pub branch: String,
}

/// Compact structured result of one sampling run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisPayload {
    pub repo: String,
    pub metadata: RepoMetadata,
    pub files_analyzed: usize,
    pub samples: Vec<FileSample>,
}

impl AnalysisPayload {
    /// Check the `filesAnalyzed == samples.len()` invariant
    pub fn validate(&self) -> RevoResult<()> {
        if self.files_analyzed != self.samples.len() {
            return Err(RevoError::invalid_input(format!(
                "filesAnalyzed is {} but {} samples were provided",
                self.files_analyzed,
                self.samples.len()
            )));
        }
        Ok(())
    }
}

/// Counters describing how one run went
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStats {
    /// Number of blobs in the resolved tree
    pub tree_size: usize,
    /// Number of paths chosen by the scorer
    pub selected: usize,
    /// Selected paths whose retrieval failed
    pub dropped: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_owner_name() {
        let id: RepositoryIdentifier = "rust-lang/cargo".parse().unwrap();
        assert_eq!(id.owner, "rust-lang");
        assert_eq!(id.name, "cargo");
        assert_eq!(id.to_string(), "rust-lang/cargo");
    }

    #[test]
    fn test_parse_page_url() {
        let id: RepositoryIdentifier = "https://github.com/tokio-rs/tokio/tree/master/tokio"
            .parse()
            .unwrap();
        assert_eq!(id.full_name(), "tokio-rs/tokio");

        let id: RepositoryIdentifier = "https://github.com/serde-rs/serde.git".parse().unwrap();
        assert_eq!(id.name, "serde");
    }

    #[test]
    fn test_parse_rejects_missing_name() {
        assert!("just-owner".parse::<RepositoryIdentifier>().is_err());
        assert!("https://github.com/".parse::<RepositoryIdentifier>().is_err());
        assert!(RepositoryIdentifier::new("", "repo").is_err());
    }

    #[test]
    fn test_entry_kind_deserialization() {
        let entry: FileTreeEntry =
            serde_json::from_str(r#"{"path":"vendor/lib","type":"commit"}"#).unwrap();
        assert_eq!(entry.kind, EntryKind::Other);
        assert!(!entry.is_blob());
    }

    #[test]
    fn test_payload_serializes_camel_case() {
        let payload = AnalysisPayload {
            repo: "a/b".to_string(),
            metadata: RepoMetadata::default(),
            files_analyzed: 0,
            samples: vec![],
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["filesAnalyzed"], 0);
        assert!(payload.validate().is_ok());
    }
}
