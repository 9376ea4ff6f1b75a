//! Configuration loading for pmsup.
//!
//! All settings for a run come from a single TOML file with three
//! sections, mirroring the tool's three external concerns:
//!
//! ```toml
//! [default]
//! timeout = 30          # seconds per HTTP request
//! attempts = 3          # bound on download attempts
//!
//! [server]
//! token = "xxxxxxxxxxxxxxxxxxxx"
//! host_url = "http://127.0.0.1:32400"
//! download_url = "https://plex.tv/api/downloads/5.json"
//! distro = "debian"
//! build = "linux-x86_64"
//! download_dir = "~/pms/downloads"
//! archive_dir = "~/pms/archive"
//! plexpass = true
//! # package_prefix = "plexmediaserver"
//! # package_manager = "dpkg"
//!
//! [notify]
//! api_key = "xxxxxxxxxxxxxxxxxxxx"
//! priority = 0
//! ```
//!
//! The file location is resolved in order: an explicit `--config` path,
//! the `PMSUP_CONFIG` environment variable, then the platform default
//! (`~/.config/pmsup/config.toml` on Linux). A missing file is a fatal
//! error; the tool cannot guess server addresses or tokens.
//!
//! The configuration is immutable for the run. Nothing in pmsup ever
//! writes it back.

use crate::constants::{
    CONFIG_DIR_NAME, CONFIG_ENV_VAR, CONFIG_FILE_NAME, DEFAULT_DOWNLOAD_ATTEMPTS,
    DEFAULT_PACKAGE_MANAGER, DEFAULT_PACKAGE_PREFIX, DEFAULT_TIMEOUT_SECS,
};
use crate::core::UpdaterError;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// Immutable settings for one upgrade run.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Run-wide defaults (timeouts, retry bound).
    #[serde(default)]
    pub default: Defaults,
    /// Server connection, feed selection, and path settings.
    pub server: ServerConfig,
    /// Push-notification settings. Omitting the section disables
    /// notifications.
    #[serde(default)]
    pub notify: NotifyConfig,
}

/// The `[default]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct Defaults {
    /// Per-request HTTP timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Bound on download attempts before the run gives up.
    #[serde(default = "default_attempts")]
    pub attempts: u32,
}

/// The `[server]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Authentication token sent as the `X-Plex-Token` header.
    pub token: String,
    /// Management endpoint of the locally running server.
    pub host_url: String,
    /// Vendor release feed endpoint.
    pub download_url: String,
    /// Distribution identifier to select in the feed (e.g. "debian").
    pub distro: String,
    /// Build identifier to select in the feed (e.g. "linux-x86_64").
    pub build: String,
    /// Directory release artifacts are downloaded into.
    pub download_dir: PathBuf,
    /// Directory superseded package files are moved into.
    pub archive_dir: PathBuf,
    /// Whether to request the subscriber release channel.
    #[serde(default)]
    pub plexpass: bool,
    /// File-name prefix identifying package files during archiving.
    #[serde(default = "default_package_prefix")]
    pub package_prefix: String,
    /// Package manager executable used to install the artifact.
    #[serde(default = "default_package_manager")]
    pub package_manager: String,
}

/// The `[notify]` section.
///
/// Notifications are enabled whenever `api_key` is non-empty; the section
/// may be omitted entirely to run without them.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct NotifyConfig {
    /// Prowl API key. Empty disables notifications.
    #[serde(default)]
    pub api_key: String,
    /// Prowl priority, -2 (very low) through 2 (emergency).
    #[serde(default)]
    pub priority: i8,
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_attempts() -> u32 {
    DEFAULT_DOWNLOAD_ATTEMPTS
}

fn default_package_prefix() -> String {
    DEFAULT_PACKAGE_PREFIX.to_string()
}

fn default_package_manager() -> String {
    DEFAULT_PACKAGE_MANAGER.to_string()
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            attempts: default_attempts(),
        }
    }
}

impl NotifyConfig {
    /// Whether a notification should actually be posted.
    pub fn is_enabled(&self) -> bool {
        !self.api_key.is_empty()
    }
}

impl Config {
    /// Load configuration, resolving the path as documented on the module.
    ///
    /// # Errors
    ///
    /// Returns [`UpdaterError::ConfigNotFound`] when no file exists at the
    /// resolved location, and parse or validation errors otherwise.
    pub async fn load(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(p) => p,
            None => match std::env::var(CONFIG_ENV_VAR) {
                Ok(p) => PathBuf::from(p),
                Err(_) => Self::default_path()?,
            },
        };
        Self::load_from(&path).await
    }

    /// Load configuration from a specific file path.
    pub async fn load_from(path: &Path) -> Result<Self> {
        debug!("Loading configuration from {}", path.display());

        if !path.exists() {
            return Err(UpdaterError::ConfigNotFound {
                path: path.display().to_string(),
            }
            .into());
        }

        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let mut config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        config.expand_paths();
        config.validate()?;
        Ok(config)
    }

    /// Default platform-specific configuration path.
    ///
    /// `~/.config/pmsup/config.toml` on Linux, the equivalent config dir
    /// elsewhere.
    pub fn default_path() -> Result<PathBuf> {
        let base = dirs::config_dir().context("Could not determine user config directory")?;
        Ok(base.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Expand `~` in the configured directories.
    fn expand_paths(&mut self) {
        self.server.download_dir = expand_tilde(&self.server.download_dir);
        self.server.archive_dir = expand_tilde(&self.server.archive_dir);
    }

    /// Reject configurations that cannot produce a sensible run.
    fn validate(&mut self) -> Result<()> {
        if self.default.attempts == 0 {
            return Err(UpdaterError::ConfigError {
                message: "default.attempts must be at least 1".to_string(),
            }
            .into());
        }

        for (field, value) in [
            ("server.token", &self.server.token),
            ("server.host_url", &self.server.host_url),
            ("server.download_url", &self.server.download_url),
            ("server.distro", &self.server.distro),
            ("server.build", &self.server.build),
        ] {
            if value.trim().is_empty() {
                return Err(UpdaterError::ConfigError {
                    message: format!("{field} must not be empty"),
                }
                .into());
            }
        }

        // Prowl accepts -2..=2; anything else is a typo, keep the run going.
        if !(-2..=2).contains(&self.notify.priority) {
            warn!(
                "notify.priority {} out of range, clamping to [-2, 2]",
                self.notify.priority
            );
            self.notify.priority = self.notify.priority.clamp(-2, 2);
        }

        Ok(())
    }
}

fn expand_tilde(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(raw.as_ref()).into_owned())
}
