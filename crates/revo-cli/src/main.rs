//! Revo CLI application
//!
//! Samples a GitHub repository, prints the preview, and hands the payload to
//! the Revo LLM proxy for a Markdown summary and follow-up questions.
//!
//! ```bash
//! revo analyze tokio-rs/tokio          # sample and print the preview
//! revo analyze tokio-rs/tokio --json   # print the payload as JSON
//! revo summarize tokio-rs/tokio        # sample, then ask the proxy for a summary
//! revo chat tokio-rs/tokio             # summary followed by a Q/A loop
//! revo worker                          # JSON lines on stdin, messages on stdout
//! ```

mod app;
mod args;
mod commands;
mod console;
mod router;

use args::Cli;
use clap::Parser;
use console::CliConsole;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = router::route(cli).await {
        CliConsole::new(false).error(&format!("{:#}", err));
        std::process::exit(1);
    }
}
