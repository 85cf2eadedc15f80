//! CLI console utilities

use colored::*;

/// CLI console for formatted output
pub struct CliConsole {
    verbose: bool,
}

impl CliConsole {
    /// Create a new CLI console
    pub const fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.verbose {
            eprintln!("{} {}", "ℹ".blue().bold(), message);
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        eprintln!("{} {}", "✓".green().bold(), message.green());
    }

    /// Print a warning message
    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", "⚠".yellow().bold(), message.yellow());
    }

    /// Print an error message
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red().bold(), message.red());
    }

    /// Print a header
    pub fn print_header(&self, title: &str) {
        println!();
        println!("{}", title.bold().underline());
        println!("{}", "=".repeat(title.chars().count()).dimmed());
    }

    /// Print the sampling preview, highlighting the first and last lines
    pub fn print_preview(&self, preview: &str) {
        let lines: Vec<&str> = preview.lines().collect();
        for (index, line) in lines.iter().enumerate() {
            if index == 0 {
                println!("{}", line.bold());
            } else if index + 1 == lines.len() {
                println!("{}", line.green().bold());
            } else {
                println!("{}", line);
            }
        }
    }

    /// Print Markdown returned by the proxy
    pub fn print_markdown(&self, text: &str) {
        for line in text.lines() {
            if line.starts_with('#') {
                println!("{}", line.cyan().bold());
            } else if line.starts_with("---") || line.starts_with("⚡") {
                println!("{}", line.dimmed());
            } else {
                println!("{}", line);
            }
        }
    }

    /// Print one answer of the Q/A loop
    pub fn print_answer(&self, answer: &str) {
        println!();
        println!("{}", "Revo:".magenta().bold());
        self.print_markdown(answer);
        println!();
    }
}
