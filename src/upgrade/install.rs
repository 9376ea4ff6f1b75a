//! Package installation via the host package manager.
//!
//! The install step is gated on an elevated effective UID by the
//! workflow; this module assumes the gate already passed and simply runs
//! `<package_manager> -i <artifact>`, capturing output. A non-zero exit
//! is reported once as [`UpdaterError::InstallFailed`] and never retried.

use crate::config::Config;
use crate::core::UpdaterError;
use crate::utils::platform;
use anyhow::{Context, Result};
use std::path::Path;
use tokio::process::Command;
use tracing::{debug, info};

/// Runs the host package manager against a downloaded artifact.
pub struct Installer {
    package_manager: String,
}

impl Installer {
    /// Build an installer from the run configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            package_manager: config.server.package_manager.clone(),
        }
    }

    /// Install the artifact at `artifact`.
    ///
    /// # Errors
    ///
    /// [`UpdaterError::PackageManagerNotFound`] when the configured
    /// executable is not on PATH, [`UpdaterError::InstallFailed`] with
    /// the captured stderr when it exits non-zero.
    pub async fn install(&self, artifact: &Path) -> Result<()> {
        let pm = platform::find_package_manager(&self.package_manager)?;
        let command_line = format!("{} -i {}", pm.display(), artifact.display());
        debug!("Running: {command_line}");

        let output = Command::new(&pm)
            .arg("-i")
            .arg(artifact)
            .output()
            .await
            .with_context(|| format!("Failed to run {command_line}"))?;

        if !output.status.success() {
            return Err(UpdaterError::InstallFailed {
                command: command_line,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }

        info!("Installed {}", artifact.display());
        Ok(())
    }
}
