//! Error handling for pmsup.
//!
//! The error system follows two principles:
//! 1. **Strongly-typed errors** for precise handling in code
//! 2. **User-facing messages** that say what failed and where
//!
//! [`UpdaterError`] enumerates every failure mode of the upgrade workflow.
//! Variants carry the context a user needs (URLs, file names, digests,
//! package-manager output) directly in their fields.
//!
//! # Fatal vs. recoverable
//!
//! The workflow distinguishes two failure classes via
//! [`UpdaterError::is_fatal`]:
//!
//! - **Fatal**: the run cannot produce a meaningful result. Configuration
//!   problems and failures to read the server state or the release feed
//!   fall here; they propagate straight out of `main`.
//! - **Recoverable**: a step failed but the run can still report an
//!   outcome and notify. Download exhaustion and install failures fall
//!   here; the workflow reports them, sends a failure notification, and
//!   then exits non-zero.
//!
//! Standard library and ecosystem errors convert automatically:
//! - [`std::io::Error`] → [`UpdaterError::IoError`]
//! - [`toml::de::Error`] → [`UpdaterError::TomlError`]
//! - [`reqwest::Error`] → [`UpdaterError::HttpError`]

use thiserror::Error;

/// The main error type for pmsup operations.
///
/// Each variant represents one specific failure mode of the upgrade
/// workflow, with enough context to print a useful message without
/// chasing the error chain.
#[derive(Error, Debug)]
pub enum UpdaterError {
    /// Configuration file missing at the resolved location.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// Path that was checked for the configuration file
        path: String,
    },

    /// Configuration file present but invalid.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of what is wrong with the configuration
        message: String,
    },

    /// The management endpoint could not be queried.
    ///
    /// Raised when the local server does not answer, answers with a
    /// non-success status, or the response body cannot be read.
    #[error("Cannot read server state from {url}: {reason}")]
    ServerUnreachable {
        /// Management endpoint URL
        url: String,
        /// Transport or HTTP status detail
        reason: String,
    },

    /// The management endpoint answered with an unusable document.
    #[error("Invalid server state response: {reason}")]
    ServerStateInvalid {
        /// What was wrong with the XML document
        reason: String,
    },

    /// The vendor release feed could not be queried.
    #[error("Cannot read release feed from {url}: {reason}")]
    FeedUnreachable {
        /// Release feed URL
        url: String,
        /// Transport or HTTP status detail
        reason: String,
    },

    /// The release feed answered with an unusable document.
    #[error("Invalid release feed response: {reason}")]
    FeedInvalid {
        /// What was wrong with the JSON document
        reason: String,
    },

    /// No feed entry matched the configured distro/build pair.
    #[error("No release found for distro '{distro}' build '{build}'")]
    ReleaseNotFound {
        /// Configured distribution identifier
        distro: String,
        /// Configured build identifier
        build: String,
    },

    /// Every download attempt failed verification or transport.
    #[error("Download of {url} failed after {attempts} attempt(s)")]
    DownloadFailed {
        /// Artifact URL
        url: String,
        /// Number of attempts made before giving up
        attempts: u32,
    },

    /// A downloaded file's digest did not match the feed's checksum.
    #[error("Checksum mismatch for {file}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// Path of the file that failed verification
        file: String,
        /// Digest advertised by the release feed
        expected: String,
        /// Digest computed from the file on disk
        actual: String,
    },

    /// The configured package manager is not on PATH.
    #[error("Package manager '{name}' not found in PATH")]
    PackageManagerNotFound {
        /// Executable name that could not be located
        name: String,
    },

    /// The package manager exited non-zero.
    ///
    /// Install failures are reported once and never retried.
    #[error("Install failed: `{command}` exited with {status}")]
    InstallFailed {
        /// Command line that was executed
        command: String,
        /// Exit status description
        status: String,
        /// Captured standard error of the package manager
        stderr: String,
    },

    /// The push-notification service rejected or never received the post.
    ///
    /// Callers log this and move on; it never fails a run.
    #[error("Notification failed: {reason}")]
    NotificationFailed {
        /// Transport or HTTP status detail
        reason: String,
    },

    /// I/O error wrapper
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// TOML parsing error wrapper
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// HTTP transport error wrapper
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
}

impl UpdaterError {
    /// Whether this failure ends the run before any outcome exists.
    ///
    /// Fatal errors are raised while establishing the facts of the run
    /// (configuration, server state, feed contents). Everything after the
    /// upgrade decision is recoverable: the workflow reports it, notifies,
    /// and exits with a failure status instead of aborting mid-sentence.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::ConfigNotFound { .. }
            | Self::ConfigError { .. }
            | Self::ServerUnreachable { .. }
            | Self::ServerStateInvalid { .. }
            | Self::FeedUnreachable { .. }
            | Self::FeedInvalid { .. }
            | Self::ReleaseNotFound { .. }
            | Self::TomlError(_) => true,
            Self::DownloadFailed { .. }
            | Self::ChecksumMismatch { .. }
            | Self::PackageManagerNotFound { .. }
            | Self::InstallFailed { .. }
            | Self::NotificationFailed { .. } => false,
            // Transport and IO wrappers depend on where they were raised;
            // treated as fatal since the typed variants cover the
            // recoverable paths.
            Self::IoError(_) | Self::HttpError(_) => true,
        }
    }
}
