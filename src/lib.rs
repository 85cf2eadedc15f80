//! Revo: repository sampling for AI summaries
//!
//! The library lives in `revo-core`; the `revo` binary lives in `revo-cli`.

pub use revo_core::*;
