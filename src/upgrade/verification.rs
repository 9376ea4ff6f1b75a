//! Download verification and integrity checking.
//!
//! The vendor feed publishes a SHA-1 digest next to every release
//! artifact; every byte written to the download directory is verified
//! against it before the installer is allowed anywhere near the file.

use crate::core::UpdaterError;
use anyhow::{Context, Result};
use sha1::{Digest, Sha1};
use std::path::Path;
use tokio::fs;
use tracing::{debug, info};

/// Verifies artifact integrity using the feed's SHA-1 checksum.
pub struct ChecksumVerifier;

impl ChecksumVerifier {
    /// Compute the SHA-1 digest of a file, hex encoded.
    pub async fn compute_sha1(file_path: &Path) -> Result<String> {
        debug!("Computing SHA-1 checksum for {}", file_path.display());

        let contents = fs::read(file_path)
            .await
            .with_context(|| format!("Failed to read file: {}", file_path.display()))?;

        let mut hasher = Sha1::new();
        hasher.update(&contents);
        Ok(hex::encode(hasher.finalize()))
    }

    /// Whether the file's digest equals `expected` (case-insensitive).
    ///
    /// A missing file is simply `false`, which is what the
    /// already-downloaded check wants.
    pub async fn matches(file_path: &Path, expected: &str) -> Result<bool> {
        if !file_path.exists() {
            return Ok(false);
        }
        let actual = Self::compute_sha1(file_path).await?;
        Ok(actual.eq_ignore_ascii_case(expected))
    }

    /// Verify a file against an expected digest.
    ///
    /// # Errors
    ///
    /// [`UpdaterError::ChecksumMismatch`] carrying both digests.
    pub async fn verify(file_path: &Path, expected: &str) -> Result<()> {
        let actual = Self::compute_sha1(file_path).await?;
        if !actual.eq_ignore_ascii_case(expected) {
            return Err(UpdaterError::ChecksumMismatch {
                file: file_path.display().to_string(),
                expected: expected.to_lowercase(),
                actual,
            }
            .into());
        }
        info!("Checksum verified for {}", file_path.display());
        Ok(())
    }
}
