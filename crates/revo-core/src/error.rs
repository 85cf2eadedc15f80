//! Error types for Revo

use thiserror::Error;

/// Result type alias for Revo operations
pub type RevoResult<T> = Result<T, RevoError>;

/// Main error type for Revo
///
/// Only `MetadataUnavailable` and `TreeUnavailable` end a sampling run. Failures
/// while fetching individual files never surface here; they shrink the sample
/// set instead.
#[derive(Error, Debug, Clone)]
pub enum RevoError {
    /// Repository metadata could not be retrieved
    #[error("GitHub metadata fetch failed ({0})")]
    MetadataUnavailable(String),

    /// Neither the branch tree nor the commit tree could be retrieved
    #[error("Could not retrieve repo tree: {0}")]
    TreeUnavailable(String),

    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(String),

    /// Invalid input errors, shown to the caller verbatim
    #[error("{0}")]
    InvalidInput(String),

    /// LLM proxy errors
    #[error("AI handoff failed: {0}")]
    Handoff(String),

    /// Background worker failures
    #[error("Repository worker failed: {0}")]
    Worker(String),

    /// Run was superseded or shut down
    #[error("Run was cancelled")]
    Cancelled,
}

impl RevoError {
    /// Create a new metadata error
    pub fn metadata(message: impl Into<String>) -> Self {
        Self::MetadataUnavailable(message.into())
    }

    /// Create a new tree error
    pub fn tree(message: impl Into<String>) -> Self {
        Self::TreeUnavailable(message.into())
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a new HTTP error
    pub fn http(message: impl Into<String>) -> Self {
        Self::Http(message.into())
    }

    /// Create a new invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create a new handoff error
    pub fn handoff(message: impl Into<String>) -> Self {
        Self::Handoff(message.into())
    }

    /// Create a new worker error
    pub fn worker(message: impl Into<String>) -> Self {
        Self::Worker(message.into())
    }

    /// Whether this error ends a run and must be reported to the caller
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

impl From<std::io::Error> for RevoError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<serde_json::Error> for RevoError {
    fn from(error: serde_json::Error) -> Self {
        Self::Json(error.to_string())
    }
}

impl From<reqwest::Error> for RevoError {
    fn from(error: reqwest::Error) -> Self {
        Self::Http(error.to_string())
    }
}

impl From<toml::de::Error> for RevoError {
    fn from(error: toml::de::Error) -> Self {
        Self::Config(error.to_string())
    }
}

impl From<url::ParseError> for RevoError {
    fn from(error: url::ParseError) -> Self {
        Self::Config(format!("invalid URL: {}", error))
    }
}
