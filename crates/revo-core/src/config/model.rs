//! Configuration data model

use crate::config::timeouts::{endpoints, network, sampling};
use crate::error::{RevoError, RevoResult};
use crate::pipeline::scoring::ScoringTable;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Top-level Revo configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RevoConfig {
    pub sampling: SamplingConfig,
    pub github: GitHubConfig,
    pub handoff: HandoffConfig,
    /// Custom scoring table; the built-in table is used when absent
    pub scoring: Option<ScoringTable>,
}

impl RevoConfig {
    /// Validate the whole configuration
    pub fn validate(&self) -> RevoResult<()> {
        self.github.validate()?;
        self.handoff.validate()?;
        if let Some(table) = &self.scoring {
            table.validate()?;
        }
        Ok(())
    }

    /// Scoring table in effect
    pub fn scoring_table(&self) -> ScoringTable {
        self.scoring.clone().unwrap_or_default()
    }
}

/// Limits applied to every sampling run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Maximum number of files selected for sampling
    pub sample_limit: usize,
    /// Maximum snippet length in characters
    pub max_snippet_length: usize,
    /// Number of concurrent content fetches
    pub concurrency: usize,
    /// Pause between batches when running inline
    #[serde(with = "humantime_serde")]
    pub inline_pause: Duration,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            sample_limit: sampling::SAMPLE_LIMIT,
            max_snippet_length: sampling::MAX_SNIPPET_LENGTH,
            concurrency: sampling::CONCURRENCY,
            inline_pause: sampling::inline_pause(),
        }
    }
}

impl SamplingConfig {
    /// Copy with every limit raised to at least one
    pub fn clamped(&self) -> Self {
        Self {
            sample_limit: self.sample_limit.max(1),
            max_snippet_length: self.max_snippet_length.max(1),
            concurrency: self.concurrency.max(1),
            inline_pause: self.inline_pause,
        }
    }
}

/// Code-hosting provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// REST API base URL
    pub api_base: String,
    /// Raw content base URL
    pub raw_base: String,
    /// Personal access token
    pub token: Option<String>,
    pub user_agent: String,
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base: endpoints::GITHUB_API.to_string(),
            raw_base: endpoints::GITHUB_RAW.to_string(),
            token: None,
            user_agent: endpoints::USER_AGENT.to_string(),
            request_timeout: network::http_request_timeout(),
            connect_timeout: network::connection_timeout(),
        }
    }
}

impl GitHubConfig {
    /// Validate the provider settings
    pub fn validate(&self) -> RevoResult<()> {
        validate_base_url("github.api_base", &self.api_base)?;
        validate_base_url("github.raw_base", &self.raw_base)?;
        if self.request_timeout.is_zero() {
            return Err(RevoError::config("github.request_timeout must be greater than 0"));
        }
        Ok(())
    }

    /// Copy carrying a per-run token, keeping the configured one when none is given
    pub fn with_token(&self, token: Option<&str>) -> Self {
        let mut config = self.clone();
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            config.token = Some(token.trim().to_string());
        }
        config
    }
}

/// LLM proxy settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HandoffConfig {
    /// Base URL hosting `/api/analyzeRepo` and `/api/askRevo`
    pub api_base: String,
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for HandoffConfig {
    fn default() -> Self {
        Self {
            api_base: endpoints::HANDOFF_API.to_string(),
            request_timeout: network::handoff_request_timeout(),
        }
    }
}

impl HandoffConfig {
    pub fn validate(&self) -> RevoResult<()> {
        validate_base_url("handoff.api_base", &self.api_base)
    }
}

fn validate_base_url(field: &str, value: &str) -> RevoResult<()> {
    if value.trim().is_empty() {
        return Err(RevoError::config(format!("{} must not be empty", field)));
    }
    let url = Url::parse(value)
        .map_err(|e| RevoError::config(format!("{} is not a valid URL: {}", field, e)))?;
    if url.cannot_be_a_base() {
        return Err(RevoError::config(format!("{} cannot be used as a base URL", field)));
    }
    Ok(())
}
