//! The `run` command: the full upgrade workflow.
//!
//! A linear sequence of steps where the interesting part is what happens
//! when one of them fails. Fatal steps (config, server state, feed)
//! propagate; the download and install steps report, notify, and end the
//! run with a failure status; archiving and notification never fail
//! anything.

use crate::config::Config;
use crate::feed::{FeedClient, ReleaseInfo};
use crate::notify::ProwlNotifier;
use crate::server::{ServerClient, ServerState};
use crate::upgrade::{
    upgrade_available, Archiver, DownloadStatus, Downloader, Installer, UpgradeOutcome,
};
use crate::utils::platform;
use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use tracing::debug;

/// Command-line arguments for the run command.
///
/// The workflow is deliberately not parameterized: everything that
/// varies between hosts lives in the configuration file, so a cron entry
/// is just `pmsup run`.
#[derive(Parser, Debug)]
pub struct RunCommand {}

impl RunCommand {
    /// Execute the full upgrade workflow.
    pub async fn execute(self) -> Result<()> {
        let config = Config::load(None).await?;
        let outcome = perform_run(&config).await?;

        match outcome {
            UpgradeOutcome::UpToDate => {}
            UpgradeOutcome::DownloadedOnly { version } => {
                println!(
                    "{}",
                    format!("Version {version} downloaded; rerun as root to install it.").yellow()
                );
            }
            UpgradeOutcome::Installed { from, to, archived } => {
                println!("{}", format!("Upgraded {from} -> {to}").green());
                if archived > 0 {
                    println!("Archived {archived} old package file(s)");
                }
            }
        }
        Ok(())
    }
}

/// Run every workflow step against a loaded configuration.
pub(crate) async fn perform_run(config: &Config) -> Result<UpgradeOutcome> {
    let server = ServerClient::new(config)?;
    let feed = FeedClient::new(config)?;
    let notifier = ProwlNotifier::new(config)?;

    // Establish the facts of the run. Failures up to here are fatal.
    let state = server.fetch_state().await?;
    let release = feed.fetch_release().await?;

    if !upgrade_available(&state, &release) {
        println!(
            "{}",
            format!(
                "Server '{}' is already running the latest version ({}), nothing to do.",
                state.friendly_name, state.current_version
            )
            .green()
        );
        return Ok(UpgradeOutcome::UpToDate);
    }

    println!(
        "{}",
        format!(
            "Upgrade available: {} -> {}",
            state.current_version, release.available_version
        )
        .cyan()
    );
    report_privileges();

    // Download is bounded-retry; exhaustion ends the run with a
    // notified failure.
    let downloader = Downloader::new(config)?;
    let status = match downloader.fetch(&release).await {
        Ok(status) => status,
        Err(e) => {
            notify_failure(&notifier, &state, &release, "download failed").await;
            return Err(e);
        }
    };
    match status {
        DownloadStatus::AlreadyDownloaded => println!("File already downloaded."),
        DownloadStatus::Downloaded { attempts } => {
            debug!("Downloaded in {attempts} attempt(s)");
            println!("Downloaded {}", release.local_filename.display());
        }
    }

    if !platform::is_elevated() {
        println!(
            "{}",
            "Elevated privileges are required to install the package; skipping install.".yellow()
        );
        return Ok(UpgradeOutcome::DownloadedOnly {
            version: release.available_version,
        });
    }

    let installer = Installer::new(config);
    if let Err(e) = installer.install(&release.local_filename).await {
        notify_failure(&notifier, &state, &release, "install failed").await;
        return Err(e);
    }

    println!("{}", "Server upgraded successfully".green());
    print_changelog(&release);

    if let Some(notifier) = &notifier {
        notifier
            .send_best_effort(
                &state.friendly_name,
                &format!(
                    "Upgraded from {} to {}",
                    state.current_version, release.available_version
                ),
            )
            .await;
    }

    // Best effort; the outcome only records how many files moved.
    let archived = Archiver::new(config)
        .archive_superseded(&release.local_filename)
        .await;

    Ok(UpgradeOutcome::Installed {
        from: state.current_version,
        to: release.available_version,
        archived,
    })
}

/// Print who we are running as, the way an operator would check it.
fn report_privileges() {
    debug!(
        "Running with UID {} (effective {})",
        platform::real_uid(),
        platform::effective_uid()
    );
    if !platform::is_elevated() {
        println!(
            "{}",
            "Not running as root: the package will be downloaded but not installed.".yellow()
        );
    }
}

/// Print the changelog the feed ships with the release.
fn print_changelog(release: &ReleaseInfo) {
    if !release.items_added.is_empty() {
        println!("\nNew features\n------------\n{}", release.items_added);
    }
    if !release.items_fixed.is_empty() {
        println!("\nBug fixes\n---------\n{}", release.items_fixed);
    }
}

/// Send a failure notification when a notifier is configured.
async fn notify_failure(
    notifier: &Option<ProwlNotifier>,
    state: &ServerState,
    release: &ReleaseInfo,
    what: &str,
) {
    if let Some(notifier) = notifier {
        notifier
            .send_best_effort(
                &state.friendly_name,
                &format!("Upgrade to {} {what}", release.available_version),
            )
            .await;
    }
}
