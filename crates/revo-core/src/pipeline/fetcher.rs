//! Bounded-concurrency content retrieval
//!
//! A fixed number of logical workers pull paths from a shared cursor, each
//! with at most one request in flight. Failed retrievals are dropped and
//! counted, never reported individually.

use super::redact::{SENSITIVE_PLACEHOLDER, is_sensitive_path, to_snippet, truncate_chars};
use crate::error::{RevoError, RevoResult};
use crate::github::RepoHost;
use crate::types::{FileSample, RepositoryIdentifier};
use futures::future::join_all;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Bytes of raw body read beyond the worst-case UTF-8 size of a snippet, so a
/// secret straddling the cut is still redacted
const REDACTION_CONTEXT_BYTES: usize = 4096;

/// Most bytes worth reading for a snippet of `max_chars` characters
fn raw_budget(max_chars: usize) -> usize {
    max_chars
        .saturating_mul(4)
        .saturating_add(REDACTION_CONTEXT_BYTES)
}

/// Scheduling context for one fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// Every path goes through the pool in one pass
    Pooled,
    /// Paths go through the pool in groups of `batch`, yielding and pausing
    /// between groups so other work on the same runtime keeps moving
    Cooperative { batch: usize, pause: Duration },
}

impl Schedule {
    pub fn cooperative(batch: usize, pause: Duration) -> Self {
        Self::Cooperative {
            batch: batch.max(1),
            pause,
        }
    }
}

/// Samples collected by one fetch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchReport {
    /// Samples in selection order
    pub samples: Vec<FileSample>,
    /// Paths whose retrieval failed
    pub dropped: usize,
}

/// Retrieves, redacts and truncates the selected files of one repository
pub struct ContentFetcher<'a> {
    host: &'a dyn RepoHost,
    repo: &'a RepositoryIdentifier,
    branch: &'a str,
    concurrency: usize,
    max_snippet_length: usize,
    cancel: CancellationToken,
}

impl<'a> ContentFetcher<'a> {
    pub fn new(host: &'a dyn RepoHost, repo: &'a RepositoryIdentifier, branch: &'a str) -> Self {
        Self {
            host,
            repo,
            branch,
            concurrency: crate::config::timeouts::sampling::CONCURRENCY,
            max_snippet_length: crate::config::timeouts::sampling::MAX_SNIPPET_LENGTH,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_max_snippet_length(mut self, max: usize) -> Self {
        self.max_snippet_length = max;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Fetch every path under the given schedule
    ///
    /// Fails only with [`RevoError::Cancelled`].
    pub async fn fetch(&self, paths: &[String], schedule: Schedule) -> RevoResult<FetchReport> {
        let slots = match schedule {
            Schedule::Pooled => self.run_pool(paths).await,
            Schedule::Cooperative { batch, pause } => {
                let mut slots = Vec::with_capacity(paths.len());
                for (index, group) in paths.chunks(batch.max(1)).enumerate() {
                    if index > 0 {
                        self.pause(pause).await;
                    }
                    if self.cancel.is_cancelled() {
                        break;
                    }
                    slots.extend(self.run_pool(group).await);
                }
                slots
            }
        };

        if self.cancel.is_cancelled() {
            return Err(RevoError::Cancelled);
        }

        let samples: Vec<FileSample> = slots.into_iter().flatten().collect();
        let dropped = paths.len() - samples.len();
        if dropped > 0 {
            warn!(repo = %self.repo, dropped, "some files could not be retrieved");
        }
        Ok(FetchReport { samples, dropped })
    }

    async fn pause(&self, pause: Duration) {
        tokio::task::yield_now().await;
        if !pause.is_zero() {
            tokio::select! {
                _ = self.cancel.cancelled() => {}
                _ = tokio::time::sleep(pause) => {}
            }
        }
    }

    /// Run `min(concurrency, paths)` workers over `paths`; slot `i` holds the
    /// sample of `paths[i]`
    async fn run_pool(&self, paths: &[String]) -> Vec<Option<FileSample>> {
        let cursor = AtomicUsize::new(0);
        let workers = (0..self.concurrency.min(paths.len())).map(|_| self.worker(paths, &cursor));

        let mut slots = vec![None; paths.len()];
        for (index, sample) in join_all(workers).await.into_iter().flatten() {
            slots[index] = sample;
        }
        slots
    }

    async fn worker(
        &self,
        paths: &[String],
        cursor: &AtomicUsize,
    ) -> Vec<(usize, Option<FileSample>)> {
        let mut done = Vec::new();
        loop {
            let index = cursor.fetch_add(1, Ordering::Relaxed);
            let Some(path) = paths.get(index) else {
                break;
            };
            if self.cancel.is_cancelled() {
                break;
            }
            done.push((index, self.fetch_one(path).await));
        }
        done
    }

    async fn fetch_one(&self, path: &str) -> Option<FileSample> {
        if is_sensitive_path(path) {
            debug!(path, "sensitive file, not fetched");
            return Some(FileSample {
                path: path.to_string(),
                snippet: truncate_chars(SENSITIVE_PLACEHOLDER, self.max_snippet_length),
            });
        }

        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return None,
            result = self.host.raw_file(
                self.repo,
                self.branch,
                path,
                raw_budget(self.max_snippet_length),
            ) => result,
        };

        match result {
            Ok(body) => Some(FileSample {
                path: path.to_string(),
                snippet: to_snippet(&body, self.max_snippet_length),
            }),
            Err(err) => {
                debug!(path, error = %err, "dropping file");
                None
            }
        }
    }
}
