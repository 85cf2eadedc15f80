//! Centralized default values
//!
//! All values can be overridden via configuration.

/// Default timeout values for network operations
pub mod network {
    use std::time::Duration;

    /// Default timeout for a single provider request (30 seconds)
    pub const HTTP_REQUEST_SECS: u64 = 30;

    /// Default connection timeout (10 seconds)
    pub const CONNECTION_SECS: u64 = 10;

    /// Default timeout for LLM proxy requests (90 seconds)
    pub const HANDOFF_REQUEST_SECS: u64 = 90;

    pub fn http_request_timeout() -> Duration {
        Duration::from_secs(HTTP_REQUEST_SECS)
    }

    pub fn connection_timeout() -> Duration {
        Duration::from_secs(CONNECTION_SECS)
    }

    pub fn handoff_request_timeout() -> Duration {
        Duration::from_secs(HANDOFF_REQUEST_SECS)
    }
}

/// Default sampling limits
pub mod sampling {
    use std::time::Duration;

    /// Maximum number of files selected per run
    pub const SAMPLE_LIMIT: usize = 15;

    /// Maximum snippet length in characters
    pub const MAX_SNIPPET_LENGTH: usize = 1000;

    /// Number of concurrent content fetches
    pub const CONCURRENCY: usize = 4;

    /// Pause between cooperative fetch batches (20 milliseconds)
    pub const INLINE_PAUSE_MS: u64 = 20;

    pub fn inline_pause() -> Duration {
        Duration::from_millis(INLINE_PAUSE_MS)
    }
}

/// Default endpoints
pub mod endpoints {
    pub const GITHUB_API: &str = "https://api.github.com";
    pub const GITHUB_RAW: &str = "https://raw.githubusercontent.com";
    pub const HANDOFF_API: &str = "https://rev0.vercel.app";
    pub const USER_AGENT: &str = concat!("revo/", env!("CARGO_PKG_VERSION"));
}
