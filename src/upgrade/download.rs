//! Idempotent, resumable artifact download.
//!
//! The download step is the only part of the workflow that retries. Its
//! contract, in order:
//!
//! 1. A file already at the target path whose digest matches the feed's
//!    checksum counts as downloaded; no network traffic happens.
//! 2. Otherwise the artifact is streamed to disk and its digest is
//!    recomputed. A mismatch removes the bad file and retries after a
//!    fixed delay.
//! 3. Attempts are bounded by `default.attempts`. Exhausting them is a
//!    terminal failure for the run, reported as
//!    [`UpdaterError::DownloadFailed`]; the installer never sees an
//!    unverified file.

use crate::config::Config;
use crate::constants::{DOWNLOAD_RETRY_DELAY_MS, USER_AGENT};
use crate::core::UpdaterError;
use crate::feed::ReleaseInfo;
use crate::upgrade::verification::ChecksumVerifier;
use crate::utils::progress::ProgressBar;
use anyhow::{Context, Result};
use futures::StreamExt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_retry::strategy::FixedInterval;
use tokio_retry::Retry;
use tracing::{debug, info, warn};

/// How a successful download step concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadStatus {
    /// A verified file was already on disk; nothing was fetched.
    AlreadyDownloaded,
    /// The artifact was fetched and verified within the attempt bound.
    Downloaded {
        /// Attempts consumed, counting the successful one.
        attempts: u32,
    },
}

/// Streams release artifacts to disk with checksum verification.
pub struct Downloader {
    client: reqwest::Client,
    attempts: u32,
    retry_delay: Duration,
}

impl Downloader {
    /// Build a downloader from the run configuration.
    pub fn new(config: &Config) -> Result<Self> {
        // Connect timeout only. A whole-request timeout would abort any
        // artifact that takes longer than `default.timeout` to stream.
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.default.timeout))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client for downloads")?;

        Ok(Self {
            client,
            attempts: config.default.attempts,
            retry_delay: Duration::from_millis(DOWNLOAD_RETRY_DELAY_MS),
        })
    }

    /// Fetch the release artifact to its local path, verified.
    ///
    /// # Errors
    ///
    /// [`UpdaterError::DownloadFailed`] once the attempt bound is
    /// exhausted. Individual attempt failures are logged, not returned.
    pub async fn fetch(&self, release: &ReleaseInfo) -> Result<DownloadStatus> {
        if ChecksumVerifier::matches(&release.local_filename, &release.checksum).await? {
            info!(
                "File already downloaded: {}",
                release.local_filename.display()
            );
            return Ok(DownloadStatus::AlreadyDownloaded);
        }

        if let Some(parent) = release.local_filename.parent() {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create download directory {}", parent.display())
            })?;
        }

        let attempted = AtomicU32::new(0);
        let strategy =
            FixedInterval::new(self.retry_delay).take(self.attempts.saturating_sub(1) as usize);

        let result = Retry::spawn(strategy, || async {
            let attempt = attempted.fetch_add(1, Ordering::SeqCst) + 1;
            match self.attempt(release, attempt).await {
                Ok(()) => Ok(()),
                Err(e) => {
                    warn!("Download attempt {attempt} of {} failed: {e:#}", self.attempts);
                    Err(e)
                }
            }
        })
        .await;

        let attempts = attempted.load(Ordering::SeqCst);
        match result {
            Ok(()) => Ok(DownloadStatus::Downloaded { attempts }),
            Err(_) => Err(UpdaterError::DownloadFailed {
                url: release.download_url.clone(),
                attempts,
            }
            .into()),
        }
    }

    /// One download attempt: stream, flush, verify, clean up on mismatch.
    async fn attempt(&self, release: &ReleaseInfo, attempt: u32) -> Result<()> {
        info!(
            "Downloading {} (attempt {attempt} of {})",
            release.download_url, self.attempts
        );

        let response = self
            .client
            .get(&release.download_url)
            .send()
            .await
            .context("Failed to request artifact")?
            .error_for_status()
            .context("Artifact request rejected")?;

        let bar = ProgressBar::new_download(response.content_length());
        bar.set_prefix(
            release
                .local_filename
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        );

        let mut file = fs::File::create(&release.local_filename)
            .await
            .with_context(|| {
                format!("Failed to create {}", release.local_filename.display())
            })?;

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.context("Failed while streaming artifact")?;
            file.write_all(&chunk)
                .await
                .context("Failed writing artifact to disk")?;
            bar.inc(chunk.len() as u64);
        }
        file.flush().await.context("Failed flushing artifact")?;
        drop(file);
        bar.finish_and_clear();

        debug!("Download complete, checking checksum");
        let verified = ChecksumVerifier::verify(&release.local_filename, &release.checksum).await;
        if verified.is_err() {
            // A corrupt file left behind would satisfy the skip check on
            // the next attempt or run.
            if let Err(e) = fs::remove_file(&release.local_filename).await {
                warn!(
                    "Failed to remove bad download {}: {e}",
                    release.local_filename.display()
                );
            }
        }
        verified
    }
}
