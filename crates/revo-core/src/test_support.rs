//! In-memory provider used by unit tests

use crate::error::{RevoError, RevoResult};
use crate::github::{HostConnector, RepoHost, TreeListing};
use crate::types::{FileTreeEntry, RepoMetadata, RepositoryIdentifier};
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Serves a fixed set of files from the `main` branch
#[derive(Debug, Default)]
pub struct StaticHost {
    files: Vec<(String, String)>,
    delay: Duration,
    panic_on_raw: bool,
    requests: AtomicUsize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl StaticHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file to the tree and serve its contents
    pub fn with_file(mut self, path: &str, body: &str) -> Self {
        self.files.push((path.to_string(), body.to_string()));
        self
    }

    /// List a path in the tree without serving it
    pub fn with_unreadable(mut self, path: &str) -> Self {
        self.files.push((path.to_string(), String::new()));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn panicking(mut self) -> Self {
        self.panic_on_raw = true;
        self
    }

    /// Raw requests received so far
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn body(&self, path: &str) -> Option<&str> {
        self.files
            .iter()
            .find(|(p, body)| p == path && !body.is_empty())
            .map(|(_, body)| body.as_str())
    }
}

#[async_trait]
impl RepoHost for StaticHost {
    async fn repository(&self, repo: &RepositoryIdentifier) -> RevoResult<RepoMetadata> {
        Ok(RepoMetadata {
            name: repo.full_name(),
            description: Some("A test repository".to_string()),
            stars: 42,
            forks: 7,
            language: Some("JavaScript".to_string()),
            branch: "main".to_string(),
        })
    }

    async fn tree(&self, _repo: &RepositoryIdentifier, reference: &str) -> RevoResult<TreeListing> {
        if reference != "main" {
            return Err(RevoError::http(format!("unknown reference {}", reference)));
        }
        Ok(TreeListing {
            entries: self.files.iter().map(|(p, _)| FileTreeEntry::blob(p.as_str())).collect(),
            truncated: false,
        })
    }

    async fn commit_tree_sha(
        &self,
        _repo: &RepositoryIdentifier,
        _branch: &str,
    ) -> RevoResult<String> {
        Err(RevoError::http("commits are not served"))
    }

    async fn raw_file(
        &self,
        _repo: &RepositoryIdentifier,
        _branch: &str,
        path: &str,
        _max_bytes: usize,
    ) -> RevoResult<String> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.panic_on_raw {
            panic!("raw fetch exploded");
        }
        self.body(path)
            .map(str::to_string)
            .ok_or_else(|| RevoError::http(format!("{} returned 404 Not Found", path)))
    }
}

/// Hands every run the same shared host
pub struct StaticConnector {
    host: Arc<StaticHost>,
}

impl StaticConnector {
    pub fn new(host: StaticHost) -> Self {
        Self {
            host: Arc::new(host),
        }
    }
}

impl HostConnector for StaticConnector {
    fn connect(&self, _token: Option<&str>) -> RevoResult<Arc<dyn RepoHost>> {
        Ok(self.host.clone())
    }
}
