//! Archiving of superseded package files.
//!
//! After a successful install, prior package artifacts are moved out of
//! the download directory into the archive directory so the download
//! directory only ever holds the current release. The step is strictly
//! best effort: every failure is logged and skipped, and the run's
//! outcome never depends on it.
//!
//! A file is an archive candidate when it is a plain file under the
//! download directory whose name starts with the configured package
//! prefix and is not the just-installed artifact itself.

use crate::config::Config;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Relocates superseded package files into the archive directory.
pub struct Archiver {
    download_dir: PathBuf,
    archive_dir: PathBuf,
    package_prefix: String,
}

impl Archiver {
    /// Build an archiver from the run configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            download_dir: config.server.download_dir.clone(),
            archive_dir: config.server.archive_dir.clone(),
            package_prefix: config.server.package_prefix.clone(),
        }
    }

    /// Move every superseded package file into the archive directory,
    /// keeping `keep` in place. Returns the number of files moved.
    pub async fn archive_superseded(&self, keep: &Path) -> usize {
        info!("Archiving old package files");

        if let Err(e) = fs::create_dir_all(&self.archive_dir).await {
            warn!(
                "Cannot create archive directory {}: {e}",
                self.archive_dir.display()
            );
            return 0;
        }

        let mut moved = 0;
        for file in collect_candidates(&self.download_dir, &self.package_prefix, keep) {
            let Some(name) = file.file_name() else {
                continue;
            };
            let target = self.archive_dir.join(name);
            match move_file(&file, &target).await {
                Ok(()) => {
                    debug!("Archived {} -> {}", file.display(), target.display());
                    moved += 1;
                }
                Err(e) => warn!("Failed to archive {}: {e}", file.display()),
            }
        }
        moved
    }
}

/// Scan `dir` for package files to archive, excluding `keep`.
pub(crate) fn collect_candidates(dir: &Path, prefix: &str, keep: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path != keep)
        .filter(|path| {
            path.file_name()
                .map(|n| n.to_string_lossy().starts_with(prefix))
                .unwrap_or(false)
        })
        .collect()
}

/// Rename, falling back to copy+remove when the archive directory lives
/// on a different filesystem.
async fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    match fs::rename(from, to).await {
        Ok(()) => Ok(()),
        Err(_) => {
            fs::copy(from, to).await?;
            fs::remove_file(from).await
        }
    }
}
