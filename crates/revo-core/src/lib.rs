//! Revo Core Library
//!
//! Repository sampling for AI summaries: resolves a repository's file tree,
//! ranks and selects the files worth reading, fetches and redacts them under
//! concurrency and size limits, and assembles a compact payload for an LLM
//! proxy. Runs go through an execution coordinator that prefers a background
//! worker thread and degrades to inline execution.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod github;
pub mod handoff;
pub mod pipeline;
pub mod protocol;
pub mod types;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use config::{GitHubConfig, HandoffConfig, RevoConfig, SamplingConfig, load_config};
pub use coordinator::{ExecutionCoordinator, ExecutionMode, RunEvent, RunTicket};
pub use error::{RevoError, RevoResult};
pub use github::{GitHubClient, GitHubConnector, HostConnector, RepoHost, TreeListing};
pub use handoff::{Conversation, HandoffClient, HandoffSummary, Latency};
pub use pipeline::{PipelineOutput, RelevanceScorer, SamplingPipeline, Schedule, ScoringTable};
pub use protocol::{AnalysisRequest, PipelineMessage};
pub use types::*;
