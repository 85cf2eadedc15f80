//! CLI argument definitions using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "revo")]
#[command(about = "Revo - AI repository explainer")]
#[command(
    long_about = r#"Revo - AI repository explainer

Samples the most relevant files of a GitHub repository, redacts likely
secrets, and hands the result to an LLM proxy for a Markdown summary.

USAGE:
  revo analyze <owner/repo>        # Sample and print the preview
  revo summarize <owner/repo>      # Sample and summarize
  revo chat <owner/repo>           # Summarize, then ask follow-up questions
  revo worker                      # Line-delimited JSON worker on stdin/stdout

Repositories may be given as owner/name or as a github.com URL."#
)]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (JSON or TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// GitHub token used for API and raw content requests
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Maximum number of files to sample
    #[arg(long, global = true)]
    pub limit: Option<usize>,

    /// Maximum snippet length in characters
    #[arg(long, global = true)]
    pub snippet: Option<usize>,

    /// Number of concurrent content fetches
    #[arg(long, global = true)]
    pub concurrency: Option<usize>,

    /// Run the pipeline on the main runtime instead of a background worker
    #[arg(long, global = true)]
    pub inline: bool,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sample a repository and print the preview
    Analyze {
        /// Repository as owner/name or URL
        repo: String,

        /// Print the payload as JSON instead of the preview
        #[arg(long)]
        json: bool,
    },

    /// Sample a repository and print an AI summary
    Summarize {
        /// Repository as owner/name or URL
        repo: String,
    },

    /// Summarize a repository, then answer follow-up questions
    Chat {
        /// Repository as owner/name or URL
        repo: String,
    },

    /// Read JSON requests from stdin and write result/error messages to stdout
    Worker,
}
