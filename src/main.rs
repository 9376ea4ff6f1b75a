//! pmsup CLI entry point.
//!
//! Parses arguments, runs the selected command, and turns any error into
//! a message on stderr plus a non-zero exit. All real behavior lives in
//! the library crate.

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use pmsup_cli::cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    // Execute the command
    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            eprintln!("{} {e:#}", "error:".red().bold());
            std::process::exit(1);
        }
    }
}
