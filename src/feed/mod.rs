//! Release feed fetcher.
//!
//! Queries the vendor's download feed for the latest release matching the
//! configured distro/build pair. The feed is a JSON document keyed by
//! device class and platform; this tool only ever reads the
//! `computer.Linux` subtree:
//!
//! ```json
//! {
//!   "computer": {
//!     "Linux": {
//!       "version": "1.32.8.7639-fb6452ebf",
//!       "items_added": "...",
//!       "items_fixed": "...",
//!       "releases": [
//!         {
//!           "distro": "debian",
//!           "build": "linux-x86_64",
//!           "url": "https://downloads.example/pms_1.32.8_amd64.deb",
//!           "checksum": "0a4afe..."
//!         }
//!       ]
//!     }
//!   }
//! }
//! ```
//!
//! When the subscriber channel is enabled, `?channel=plexpass` is
//! appended to the feed URL. Like the server state, the feed is read
//! once per run and a failure is fatal.

use crate::config::Config;
use crate::constants::{PLEXPASS_CHANNEL, TOKEN_HEADER, USER_AGENT};
use crate::core::UpdaterError;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// The release selected from the feed for this host, plus the changelog
/// the feed ships alongside it.
#[derive(Debug, Clone)]
pub struct ReleaseInfo {
    /// Version string advertised by the feed.
    pub available_version: String,
    /// Artifact download URL.
    pub download_url: String,
    /// Expected SHA-1 digest of the artifact, hex encoded.
    pub checksum: String,
    /// Local path the artifact will be downloaded to.
    pub local_filename: PathBuf,
    /// Changelog: features added in this release.
    pub items_added: String,
    /// Changelog: bugs fixed in this release.
    pub items_fixed: String,
}

/// Wire format of the vendor feed. Unknown fields are ignored.
#[derive(Debug, Deserialize)]
struct Feed {
    computer: ComputerFeed,
}

#[derive(Debug, Deserialize)]
struct ComputerFeed {
    #[serde(rename = "Linux")]
    linux: PlatformFeed,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PlatformFeed {
    version: String,
    #[serde(default)]
    items_added: String,
    #[serde(default)]
    items_fixed: String,
    releases: Vec<FeedRelease>,
}

#[derive(Debug, Deserialize)]
struct FeedRelease {
    distro: String,
    build: String,
    url: String,
    checksum: String,
}

/// Client for the vendor release feed.
pub struct FeedClient {
    client: reqwest::Client,
    feed_url: String,
    token: String,
    distro: String,
    build: String,
    download_dir: PathBuf,
}

impl FeedClient {
    /// Build a client from the run configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.default.timeout))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client for release feed fetch")?;

        Ok(Self {
            client,
            feed_url: feed_url(&config.server.download_url, config.server.plexpass),
            token: config.server.token.clone(),
            distro: config.server.distro.clone(),
            build: config.server.build.clone(),
            download_dir: config.server.download_dir.clone(),
        })
    }

    /// Fetch the feed and select the release for the configured
    /// distro/build pair.
    ///
    /// # Errors
    ///
    /// [`UpdaterError::FeedUnreachable`] / [`UpdaterError::FeedInvalid`]
    /// for transport and parse failures, [`UpdaterError::ReleaseNotFound`]
    /// when no entry matches. All fatal.
    pub async fn fetch_release(&self) -> Result<ReleaseInfo> {
        debug!("Fetching release feed from {}", self.feed_url);

        let response = self
            .client
            .get(&self.feed_url)
            .header(TOKEN_HEADER, &self.token)
            .send()
            .await
            .map_err(|e| UpdaterError::FeedUnreachable {
                url: self.feed_url.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpdaterError::FeedUnreachable {
                url: self.feed_url.clone(),
                reason: format!("HTTP {status}"),
            }
            .into());
        }

        let body = response
            .text()
            .await
            .map_err(|e| UpdaterError::FeedUnreachable {
                url: self.feed_url.clone(),
                reason: format!("failed to read response body: {e}"),
            })?;

        let release = select_release(&body, &self.distro, &self.build, &self.download_dir)?;
        info!(
            "Feed advertises version {} for {}/{}",
            release.available_version, self.distro, self.build
        );
        Ok(release)
    }
}

/// Append the subscriber channel query when enabled.
pub(crate) fn feed_url(base: &str, plexpass: bool) -> String {
    if plexpass {
        format!("{base}?channel={PLEXPASS_CHANNEL}")
    } else {
        base.to_string()
    }
}

/// Parse the feed body and select the release matching `distro`/`build`.
pub(crate) fn select_release(
    body: &str,
    distro: &str,
    build: &str,
    download_dir: &Path,
) -> Result<ReleaseInfo, UpdaterError> {
    let feed: Feed = serde_json::from_str(body).map_err(|e| UpdaterError::FeedInvalid {
        reason: e.to_string(),
    })?;
    let platform = feed.computer.linux;

    let release = platform
        .releases
        .iter()
        .find(|r| r.distro == distro && r.build == build)
        .ok_or_else(|| UpdaterError::ReleaseNotFound {
            distro: distro.to_string(),
            build: build.to_string(),
        })?;

    let file_name = release
        .url
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| UpdaterError::FeedInvalid {
            reason: format!("release url '{}' has no file name", release.url),
        })?;

    Ok(ReleaseInfo {
        available_version: platform.version.clone(),
        download_url: release.url.clone(),
        checksum: release.checksum.to_lowercase(),
        local_filename: download_dir.join(file_name),
        items_added: platform.items_added.clone(),
        items_fixed: platform.items_fixed.clone(),
    })
}
