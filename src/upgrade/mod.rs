//! The upgrade workflow's moving parts.
//!
//! The run itself is a short, linear sequence (see `cli::run`): fetch
//! server state, fetch the release feed, decide, download, install,
//! archive, notify. This module holds the pieces that sequence composes:
//!
//! - [`upgrade_available`]: the upgrade decision
//! - [`download::Downloader`]: idempotent, checksum-verified download
//! - [`verification::ChecksumVerifier`]: SHA-1 integrity checks
//! - [`install::Installer`]: privilege-gated package-manager invocation
//! - [`archive::Archiver`]: best-effort relocation of superseded files
//!
//! Partial failure is the normal case this workflow is shaped around: a
//! failed download or install still produces a reported, notified
//! outcome, while anything earlier aborts the run (see
//! [`crate::core::UpdaterError::is_fatal`]).

pub mod archive;
pub mod download;
pub mod install;
pub mod verification;

pub use archive::Archiver;
pub use download::{DownloadStatus, Downloader};
pub use install::Installer;
pub use verification::ChecksumVerifier;

use crate::feed::ReleaseInfo;
use crate::server::ServerState;

/// Whether the feed's release should be applied to the running server.
///
/// Pure string inequality, by design: vendor version strings carry build
/// hashes and are not ordered, so "differs from the feed" is the whole
/// test. A feed that moves backwards would also register as available.
pub fn upgrade_available(state: &ServerState, release: &ReleaseInfo) -> bool {
    state.current_version != release.available_version
}

/// How a completed run concluded. Failures are errors, not outcomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpgradeOutcome {
    /// Server already runs the feed's version; nothing was done.
    UpToDate,
    /// Artifact downloaded and verified, but the process lacked the
    /// privileges to install it.
    DownloadedOnly {
        /// Version that is now staged in the download directory.
        version: String,
    },
    /// Artifact installed; prior packages archived.
    Installed {
        /// Version that was running before the install.
        from: String,
        /// Version that was installed.
        to: String,
        /// Number of superseded package files archived.
        archived: usize,
    },
}
