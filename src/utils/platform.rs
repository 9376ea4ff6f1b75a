//! Platform helpers: privilege inspection and executable lookup.
//!
//! Installing a system package requires an elevated effective UID. The
//! workflow checks this once, before invoking the package manager, and
//! downgrades the run to download-only when the check fails.

use crate::core::UpdaterError;
use std::path::PathBuf;

/// Effective UID of the current process.
#[cfg(unix)]
pub fn effective_uid() -> u32 {
    // SAFETY: `libc::geteuid` is a simple read-only syscall that returns
    // the calling process's effective user ID. It does not dereference
    // pointers or rely on any Rust-side invariants, so it cannot cause
    // undefined behavior.
    unsafe { libc::geteuid() }
}

/// Real UID of the current process.
#[cfg(unix)]
pub fn real_uid() -> u32 {
    // SAFETY: same contract as `geteuid` above.
    unsafe { libc::getuid() }
}

#[cfg(not(unix))]
pub fn effective_uid() -> u32 {
    u32::MAX
}

#[cfg(not(unix))]
pub fn real_uid() -> u32 {
    u32::MAX
}

/// Whether the process may install system packages.
///
/// True only for an elevated effective UID. The package manager is what
/// actually needs the privilege, so the effective UID is the one that
/// counts; the real UID is only reported in logs.
pub fn is_elevated() -> bool {
    cfg!(unix) && effective_uid() == 0
}

/// Locate the package-manager executable on PATH.
pub fn find_package_manager(name: &str) -> Result<PathBuf, UpdaterError> {
    which::which(name).map_err(|_| UpdaterError::PackageManagerNotFound {
        name: name.to_string(),
    })
}
