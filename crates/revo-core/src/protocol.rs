//! Messages exchanged with the caller of a sampling run
//!
//! Requests and messages are plain serializable data so they can cross a
//! thread or process boundary unchanged.

use crate::config::SamplingConfig;
use crate::error::{RevoError, RevoResult};
use crate::pipeline::PipelineOutput;
use crate::types::{AnalysisPayload, RepositoryIdentifier};
use serde::{Deserialize, Serialize};

/// Inbound request for one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub repo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_limit: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_snippet_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,
}

impl AnalysisRequest {
    pub fn new(repo: &RepositoryIdentifier) -> Self {
        Self {
            owner: repo.owner.clone(),
            repo: repo.name.clone(),
            ..Default::default()
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// Parse one JSON request
    pub fn from_json(text: &str) -> RevoResult<Self> {
        serde_json::from_str(text)
            .map_err(|e| RevoError::invalid_input(format!("Malformed request: {}", e)))
    }

    /// Repository the request targets
    pub fn identifier(&self) -> RevoResult<RepositoryIdentifier> {
        RepositoryIdentifier::new(self.owner.as_str(), self.repo.as_str())
    }

    /// Limits for this run: non-zero request values over `defaults`
    pub fn limits(&self, defaults: &SamplingConfig) -> SamplingConfig {
        let pick = |value: Option<usize>, default: usize| value.filter(|n| *n > 0).unwrap_or(default);
        SamplingConfig {
            sample_limit: pick(self.sample_limit, defaults.sample_limit),
            max_snippet_length: pick(self.max_snippet_length, defaults.max_snippet_length),
            concurrency: pick(self.concurrency, defaults.concurrency),
            inline_pause: defaults.inline_pause,
        }
        .clamped()
    }
}

/// Outcome of one run as delivered to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PipelineMessage {
    Result {
        payload: AnalysisPayload,
        preview: String,
    },
    Error {
        message: String,
    },
}

impl PipelineMessage {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn is_result(&self) -> bool {
        matches!(self, Self::Result { .. })
    }

    /// Parse and validate one message
    pub fn from_json(text: &str) -> RevoResult<Self> {
        let message: Self = serde_json::from_str(text)?;
        message.validate()?;
        Ok(message)
    }

    pub fn to_json(&self) -> RevoResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Check the payload invariants of a result
    pub fn validate(&self) -> RevoResult<()> {
        match self {
            Self::Result { payload, .. } => payload.validate(),
            Self::Error { .. } => Ok(()),
        }
    }

    /// Split into the payload and preview, or the error text
    pub fn into_result(self) -> Result<(AnalysisPayload, String), String> {
        match self {
            Self::Result { payload, preview } => Ok((payload, preview)),
            Self::Error { message } => Err(message),
        }
    }
}

impl From<PipelineOutput> for PipelineMessage {
    fn from(output: PipelineOutput) -> Self {
        Self::Result {
            payload: output.payload,
            preview: output.preview,
        }
    }
}

impl From<&RevoError> for PipelineMessage {
    fn from(error: &RevoError) -> Self {
        Self::error(error.to_string())
    }
}
