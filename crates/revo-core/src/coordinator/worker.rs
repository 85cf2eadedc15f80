//! Dedicated background thread running its own Tokio runtime

use super::job::{Job, RunEvent, execute};
use crate::error::{RevoError, RevoResult};
use crate::github::HostConnector;
use crate::pipeline::Schedule;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tokio::runtime::Builder;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

const WORKER_THREAD_NAME: &str = "revo-sampler";

enum WorkerCommand {
    Run(Job),
    Shutdown,
}

/// Handle to the background sampling thread
///
/// Jobs go in and [`RunEvent`]s come out as plain data. Each job brings its
/// cancellation token; a new job cancels the one still running.
pub(crate) struct BackgroundWorker {
    commands: mpsc::UnboundedSender<WorkerCommand>,
    thread: Option<JoinHandle<()>>,
}

impl BackgroundWorker {
    /// Start the thread and wait until its runtime is up
    pub fn spawn(
        connector: Arc<dyn HostConnector>,
        events: mpsc::UnboundedSender<RunEvent>,
    ) -> RevoResult<Self> {
        let (commands, inbox) = mpsc::unbounded_channel();
        let (ready_tx, ready_rx) = std::sync::mpsc::channel::<Result<(), String>>();

        let thread = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || {
                let runtime = match Builder::new_current_thread().enable_all().build() {
                    Ok(runtime) => runtime,
                    Err(err) => {
                        let _ = ready_tx.send(Err(err.to_string()));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(()));
                runtime.block_on(serve(inbox, connector, events));
                debug!("background worker stopped");
            })
            .map_err(|e| RevoError::worker(format!("could not start thread: {}", e)))?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self {
                commands,
                thread: Some(thread),
            }),
            Ok(Err(reason)) => {
                let _ = thread.join();
                Err(RevoError::worker(format!("could not start runtime: {}", reason)))
            }
            Err(_) => {
                let _ = thread.join();
                Err(RevoError::worker("thread exited during startup"))
            }
        }
    }

    /// Hand a job to the thread
    pub fn dispatch(&self, job: Job) -> RevoResult<()> {
        self.commands
            .send(WorkerCommand::Run(job))
            .map_err(|_| RevoError::worker("the background worker is gone"))
    }

    /// Stop the thread, cancelling the run in flight, and wait for it to exit
    pub fn shutdown(&mut self) {
        let _ = self.commands.send(WorkerCommand::Shutdown);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("background worker thread panicked");
            }
        }
    }
}

impl Drop for BackgroundWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn serve(
    mut inbox: mpsc::UnboundedReceiver<WorkerCommand>,
    connector: Arc<dyn HostConnector>,
    events: mpsc::UnboundedSender<RunEvent>,
) {
    let mut active: Option<CancellationToken> = None;

    while let Some(command) = inbox.recv().await {
        match command {
            WorkerCommand::Run(job) => {
                if let Some(previous) = active.replace(job.cancel.clone()) {
                    previous.cancel();
                }
                debug!(run = job.ticket.id, repo = %job.ticket.repo, "run accepted");
                tokio::spawn(execute(job, connector.clone(), Schedule::Pooled, events.clone()));
            }
            WorkerCommand::Shutdown => break,
        }
    }

    if let Some(active) = active {
        active.cancel();
    }
}
