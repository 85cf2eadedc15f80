//! One unit of work and its reply path

use crate::config::SamplingConfig;
use crate::error::RevoError;
use crate::github::HostConnector;
use crate::pipeline::{RelevanceScorer, SamplingPipeline, Schedule, ScoringTable};
use crate::protocol::PipelineMessage;
use crate::types::RepositoryIdentifier;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

/// Identifies one submitted run
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RunTicket {
    pub id: u64,
    pub repo: RepositoryIdentifier,
}

/// A message tagged with the run that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunEvent {
    pub ticket: RunTicket,
    pub message: PipelineMessage,
}

/// Plain-data description of a run, safe to move to another thread
#[derive(Debug, Clone)]
pub(crate) struct Job {
    pub ticket: RunTicket,
    pub token: Option<String>,
    pub limits: SamplingConfig,
    pub scoring: ScoringTable,
    /// Fired when the run is superseded or the session ends
    pub cancel: CancellationToken,
}

/// Sends exactly one event per run unless the run was cancelled
///
/// Dropping a pending reply reports the run as failed, so a caller never
/// waits on a run whose executor went away.
struct Reply {
    ticket: RunTicket,
    events: UnboundedSender<RunEvent>,
    pending: bool,
}

impl Reply {
    fn new(ticket: RunTicket, events: UnboundedSender<RunEvent>) -> Self {
        Self {
            ticket,
            events,
            pending: true,
        }
    }

    fn send(mut self, message: PipelineMessage) {
        self.pending = false;
        let _ = self.events.send(RunEvent {
            ticket: self.ticket.clone(),
            message,
        });
    }

    fn discard(mut self) {
        self.pending = false;
    }
}

impl Drop for Reply {
    fn drop(&mut self) {
        if self.pending {
            let err = RevoError::worker("run stopped before producing a result");
            let _ = self.events.send(RunEvent {
                ticket: self.ticket.clone(),
                message: PipelineMessage::from(&err),
            });
        }
    }
}

/// Run a job to completion and report its outcome on `events`
pub(crate) async fn execute(
    job: Job,
    connector: Arc<dyn HostConnector>,
    schedule: Schedule,
    events: UnboundedSender<RunEvent>,
) {
    let reply = Reply::new(job.ticket.clone(), events);
    match run(job, connector, schedule).await {
        Some(message) => reply.send(message),
        None => reply.discard(),
    }
}

async fn run(
    job: Job,
    connector: Arc<dyn HostConnector>,
    schedule: Schedule,
) -> Option<PipelineMessage> {
    let host = match connector.connect(job.token.as_deref()) {
        Ok(host) => host,
        Err(err) => return Some(PipelineMessage::from(&err)),
    };
    let pipeline = SamplingPipeline::new(host, RelevanceScorer::new(job.scoring), job.limits);
    let repo = job.ticket.repo.clone();
    let cancel = job.cancel.clone();

    // Own task so a panic inside the run surfaces as a JoinError
    let task = tokio::spawn(async move { pipeline.run(&repo, schedule, &cancel).await });

    match task.await {
        Ok(Ok(output)) => Some(PipelineMessage::from(output)),
        Ok(Err(RevoError::Cancelled)) => {
            debug!(run = job.ticket.id, "run cancelled");
            None
        }
        Ok(Err(err)) => Some(PipelineMessage::from(&err)),
        Err(join_err) if join_err.is_panic() => {
            error!(run = job.ticket.id, repo = %job.ticket.repo, "run panicked");
            Some(PipelineMessage::from(&RevoError::worker("the run crashed")))
        }
        Err(_) => None,
    }
}
