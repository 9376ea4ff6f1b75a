//! The `check` and `status` commands: read-only views of the decision.
//!
//! Both fetch the server state and the release feed and stop there.
//! Nothing is downloaded, no privileges are needed, and the exit code is
//! zero whether or not an upgrade is available.

use crate::config::Config;
use crate::feed::FeedClient;
use crate::server::ServerClient;
use crate::upgrade::upgrade_available;
use anyhow::Result;
use clap::Parser;
use colored::Colorize;

/// Command-line arguments for the check command.
#[derive(Parser, Debug)]
pub struct CheckCommand {}

impl CheckCommand {
    /// Check whether an upgrade is available.
    pub async fn execute(self) -> Result<()> {
        let config = Config::load(None).await?;
        let state = ServerClient::new(&config)?.fetch_state().await?;
        let release = FeedClient::new(&config)?.fetch_release().await?;

        if upgrade_available(&state, &release) {
            println!(
                "{}",
                format!(
                    "Update available: {} -> {}",
                    state.current_version, release.available_version
                )
                .green()
            );
            println!("Run `pmsup run` to download and install it");
        } else {
            println!(
                "{}",
                format!(
                    "Server '{}' is on the latest version ({})",
                    state.friendly_name, state.current_version
                )
                .green()
            );
        }
        Ok(())
    }
}

/// Command-line arguments for the status command.
#[derive(Parser, Debug)]
pub struct StatusCommand {}

impl StatusCommand {
    /// Show current and available versions with the changelog.
    pub async fn execute(self) -> Result<()> {
        let config = Config::load(None).await?;
        let state = ServerClient::new(&config)?.fetch_state().await?;
        let release = FeedClient::new(&config)?.fetch_release().await?;

        println!("Server:            {}", state.friendly_name);
        println!("Current version:   {}", state.current_version);
        let marker = if upgrade_available(&state, &release) {
            "(update available)".yellow().to_string()
        } else {
            "(up to date)".green().to_string()
        };
        println!(
            "Available version: {} {marker}",
            release.available_version
        );

        if !release.items_added.is_empty() {
            println!("\nNew features\n------------\n{}", release.items_added);
        }
        if !release.items_fixed.is_empty() {
            println!("\nBug fixes\n---------\n{}", release.items_fixed);
        }
        Ok(())
    }
}
