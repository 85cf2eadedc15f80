//! CLI commands

pub mod analyze;
pub mod chat;
pub mod summarize;
pub mod worker;
