//! Execution coordinator
//!
//! Runs the sampling pipeline off the caller's thread when a background worker
//! can be started, and inline on the caller's runtime otherwise. Either way the
//! caller sees one [`RunEvent`] per run, and only for the latest submission.

mod job;
mod worker;

pub use job::{RunEvent, RunTicket};

use crate::config::{RevoConfig, SamplingConfig};
use crate::error::{RevoError, RevoResult};
use crate::github::HostConnector;
use crate::pipeline::{Schedule, ScoringTable};
use crate::protocol::{AnalysisRequest, PipelineMessage};
use job::{Job, execute};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use worker::BackgroundWorker;

/// Where runs execute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Dedicated worker thread with its own runtime
    Background,
    /// Caller's runtime, cooperative fetch schedule
    Inline,
}

enum Runner {
    Background(BackgroundWorker),
    Inline,
}

struct ActiveRun {
    ticket: RunTicket,
    cancel: CancellationToken,
}

/// Session-scoped handle that owns the background worker
pub struct ExecutionCoordinator {
    runner: Runner,
    connector: Arc<dyn HostConnector>,
    sampling: SamplingConfig,
    scoring: ScoringTable,
    current: Mutex<Option<ActiveRun>>,
    next_id: AtomicU64,
    events_tx: mpsc::UnboundedSender<RunEvent>,
    events_rx: mpsc::UnboundedReceiver<RunEvent>,
}

impl ExecutionCoordinator {
    /// Create a coordinator, falling back to inline execution when the
    /// background worker cannot start
    pub fn new(
        connector: Arc<dyn HostConnector>,
        sampling: SamplingConfig,
        scoring: ScoringTable,
        preferred: ExecutionMode,
    ) -> Self {
        Self::with_spawner(connector, sampling, scoring, preferred, BackgroundWorker::spawn)
    }

    /// Like [`Self::new`], starting the background worker with `spawn`
    pub(crate) fn with_spawner<F>(
        connector: Arc<dyn HostConnector>,
        sampling: SamplingConfig,
        scoring: ScoringTable,
        preferred: ExecutionMode,
        spawn: F,
    ) -> Self
    where
        F: FnOnce(
            Arc<dyn HostConnector>,
            mpsc::UnboundedSender<RunEvent>,
        ) -> RevoResult<BackgroundWorker>,
    {
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let runner = match preferred {
            ExecutionMode::Inline => Runner::Inline,
            ExecutionMode::Background => {
                match spawn(connector.clone(), events_tx.clone()) {
                    Ok(worker) => Runner::Background(worker),
                    Err(err) => {
                        warn!(error = %err, "background worker unavailable, running inline");
                        Runner::Inline
                    }
                }
            }
        };

        Self {
            runner,
            connector,
            sampling: sampling.clamped(),
            scoring,
            current: Mutex::new(None),
            next_id: AtomicU64::new(1),
            events_tx,
            events_rx,
        }
    }

    pub fn from_config(
        config: &RevoConfig,
        connector: Arc<dyn HostConnector>,
        preferred: ExecutionMode,
    ) -> Self {
        Self::new(
            connector,
            config.sampling.clone(),
            config.scoring_table(),
            preferred,
        )
    }

    /// Mode actually in use
    pub fn mode(&self) -> ExecutionMode {
        match self.runner {
            Runner::Background(_) => ExecutionMode::Background,
            Runner::Inline => ExecutionMode::Inline,
        }
    }

    /// Start a run, superseding the one in flight
    ///
    /// Rejects requests without an owner or repository name. Inline execution
    /// needs to be called from within a Tokio runtime.
    pub fn submit(&self, request: AnalysisRequest) -> RevoResult<RunTicket> {
        let repo = request.identifier()?;
        let ticket = RunTicket {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            repo,
        };
        let cancel = CancellationToken::new();
        let job = Job {
            ticket: ticket.clone(),
            token: request.token.clone(),
            limits: request.limits(&self.sampling),
            scoring: self.scoring.clone(),
            cancel: cancel.clone(),
        };

        let previous = self.current.lock().replace(ActiveRun {
            ticket: ticket.clone(),
            cancel: cancel.clone(),
        });
        if let Some(previous) = previous {
            debug!(run = previous.ticket.id, repo = %previous.ticket.repo, "run superseded");
            previous.cancel.cancel();
        }

        info!(run = ticket.id, repo = %ticket.repo, mode = ?self.mode(), "run submitted");
        match &self.runner {
            Runner::Background(worker) => {
                if let Err(err) = worker.dispatch(job) {
                    let _ = self.events_tx.send(RunEvent {
                        ticket: ticket.clone(),
                        message: PipelineMessage::from(&err),
                    });
                }
            }
            Runner::Inline => self.spawn_inline(job)?,
        }
        Ok(ticket)
    }

    fn spawn_inline(&self, job: Job) -> RevoResult<()> {
        let handle = Handle::try_current()
            .map_err(|_| RevoError::worker("inline execution needs a Tokio runtime"))?;
        let schedule = Schedule::cooperative(job.limits.concurrency, job.limits.inline_pause);
        let connector = self.connector.clone();
        let events = self.events_tx.clone();

        handle.spawn(async move {
            // Let pending work on the caller's runtime go first
            tokio::task::yield_now().await;
            execute(job, connector, schedule, events).await;
        });
        Ok(())
    }

    /// Wait for the outcome of the latest submission
    ///
    /// Messages from superseded runs are discarded. Waits indefinitely when
    /// nothing was submitted.
    pub async fn recv(&mut self) -> Option<RunEvent> {
        loop {
            let event = self.events_rx.recv().await?;
            if self.finish(&event.ticket) {
                return Some(event);
            }
            debug!(run = event.ticket.id, repo = %event.ticket.repo, "discarding stale message");
        }
    }

    /// Clear the active run if `ticket` is it
    fn finish(&self, ticket: &RunTicket) -> bool {
        let mut current = self.current.lock();
        if current.as_ref().is_some_and(|run| run.ticket == *ticket) {
            *current = None;
            return true;
        }
        false
    }

    /// Submit a request and wait for its message
    pub async fn run(&mut self, request: AnalysisRequest) -> RevoResult<PipelineMessage> {
        let ticket = self.submit(request)?;
        match self.recv().await {
            Some(event) if event.ticket == ticket => Ok(event.message),
            _ => Err(RevoError::worker("no result was delivered")),
        }
    }

    /// Cancel the run in flight and stop the background worker
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(active) = self.current.lock().take() {
            active.cancel.cancel();
        }
        if let Runner::Background(worker) = &mut self.runner {
            worker.shutdown();
        }
    }
}

impl Drop for ExecutionCoordinator {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{StaticConnector, StaticHost};
    use std::time::Duration;

    fn request(owner: &str, repo: &str) -> AnalysisRequest {
        AnalysisRequest {
            owner: owner.to_string(),
            repo: repo.to_string(),
            ..Default::default()
        }
    }

    fn sample_host() -> StaticHost {
        StaticHost::new()
            .with_file("README.md", "# Widget")
            .with_file("package.json", "{}")
            .with_file("src/index.js", "export {}")
            .with_file("logo.png", "png")
    }

    fn coordinator(host: StaticHost, mode: ExecutionMode) -> ExecutionCoordinator {
        ExecutionCoordinator::new(
            Arc::new(StaticConnector::new(host)),
            SamplingConfig::default(),
            ScoringTable::default(),
            mode,
        )
    }

    #[tokio::test]
    async fn test_background_run() {
        let mut coordinator = coordinator(sample_host(), ExecutionMode::Background);
        assert_eq!(coordinator.mode(), ExecutionMode::Background);

        let message = coordinator.run(request("acme", "widget")).await.unwrap();
        let (payload, preview) = message.into_result().unwrap();
        assert_eq!(payload.files_analyzed, 3);
        assert!(preview.starts_with("📦 Repository: acme/widget"));
        coordinator.shutdown();
    }

    #[tokio::test]
    async fn test_inline_run_matches_background() {
        let mut background = coordinator(sample_host(), ExecutionMode::Background);
        let mut inline = coordinator(sample_host(), ExecutionMode::Inline);
        assert_eq!(inline.mode(), ExecutionMode::Inline);

        let a = background.run(request("acme", "widget")).await.unwrap();
        let b = inline.run(request("acme", "widget")).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_missing_owner_is_rejected() {
        let coordinator = coordinator(sample_host(), ExecutionMode::Inline);
        let err = coordinator.submit(request("", "widget")).unwrap_err();
        assert_eq!(err.to_string(), "Missing owner or repo");
    }

    #[tokio::test]
    async fn test_new_submission_supersedes() {
        for mode in [ExecutionMode::Background, ExecutionMode::Inline] {
            let host = sample_host().with_delay(Duration::from_millis(50));
            let mut coordinator = coordinator(host, mode);

            let first = coordinator.submit(request("acme", "widget")).unwrap();
            let second = coordinator.submit(request("acme", "gadget")).unwrap();
            assert_ne!(first, second);

            let event = coordinator.recv().await.unwrap();
            assert_eq!(event.ticket, second);
            let (payload, _) = event.message.into_result().unwrap();
            assert_eq!(payload.repo, "acme/gadget");
        }
    }

    #[tokio::test]
    async fn test_crashed_run_reports_error() {
        for mode in [ExecutionMode::Background, ExecutionMode::Inline] {
            let mut coordinator = coordinator(sample_host().panicking(), mode);
            let message = coordinator.run(request("acme", "widget")).await.unwrap();
            match message {
                PipelineMessage::Error { message } => {
                    assert!(message.starts_with("Repository worker failed"))
                }
                other => panic!("expected error message, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_worker_start_failure_falls_back_inline() {
        let mut coordinator = ExecutionCoordinator::with_spawner(
            Arc::new(StaticConnector::new(sample_host())),
            SamplingConfig::default(),
            ScoringTable::default(),
            ExecutionMode::Background,
            |_, _| Err(RevoError::worker("could not start runtime: no threads")),
        );
        assert_eq!(coordinator.mode(), ExecutionMode::Inline);

        let message = coordinator.run(request("acme", "widget")).await.unwrap();
        let (payload, _) = message.into_result().unwrap();
        assert_eq!(payload.files_analyzed, 3);
    }

    #[test]
    fn test_inline_submit_outside_runtime() {
        let coordinator = coordinator(sample_host(), ExecutionMode::Inline);
        assert!(matches!(
            coordinator.submit(request("acme", "widget")),
            Err(RevoError::Worker(_))
        ));
    }

    #[test]
    fn test_background_shutdown_without_runtime() {
        let coordinator = coordinator(sample_host(), ExecutionMode::Background);
        assert_eq!(coordinator.mode(), ExecutionMode::Background);
        coordinator.shutdown();
    }
}
