//! Progress indicators for long-running steps.
//!
//! A thin wrapper over `indicatif` with two styles: a byte-counting bar
//! for downloads with a known length, and a spinner for indeterminate
//! work. Bars are disabled entirely when the `PMSUP_NO_PROGRESS`
//! environment variable is set (scripts, CI, cron) or when the download
//! length is unknown and the terminal is not interactive.

use crate::constants::NO_PROGRESS_ENV_VAR;
use indicatif::{ProgressBar as IndicatifBar, ProgressStyle as IndicatifStyle};
use std::time::Duration;

/// Checks if progress bars should be disabled.
fn is_progress_disabled() -> bool {
    std::env::var(NO_PROGRESS_ENV_VAR).is_ok()
}

/// A progress bar with consistent styling across pmsup operations.
pub struct ProgressBar {
    bar: IndicatifBar,
}

impl ProgressBar {
    /// Create a byte-counting download bar.
    ///
    /// With an unknown content length this falls back to a spinner so the
    /// user still sees liveness.
    pub fn new_download(total_bytes: Option<u64>) -> Self {
        if is_progress_disabled() {
            return Self {
                bar: IndicatifBar::hidden(),
            };
        }
        let bar = match total_bytes {
            Some(len) => {
                let bar = IndicatifBar::new(len);
                bar.set_style(download_style());
                bar
            }
            None => {
                let bar = IndicatifBar::new_spinner();
                bar.set_style(spinner_style());
                bar.enable_steady_tick(Duration::from_millis(100));
                bar
            }
        };
        Self { bar }
    }

    /// Create a spinner for indeterminate work.
    pub fn new_spinner() -> Self {
        if is_progress_disabled() {
            return Self {
                bar: IndicatifBar::hidden(),
            };
        }
        let bar = IndicatifBar::new_spinner();
        bar.set_style(spinner_style());
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    /// Set the message shown next to the indicator.
    pub fn set_message(&self, msg: impl Into<String>) {
        self.bar.set_message(msg.into());
    }

    /// Set the prefix shown ahead of the bar (the artifact name, for
    /// downloads).
    pub fn set_prefix(&self, prefix: impl Into<String>) {
        self.bar.set_prefix(prefix.into());
    }

    /// Advance the bar by `delta` units (bytes, for downloads).
    pub fn inc(&self, delta: u64) {
        self.bar.inc(delta);
    }

    /// Finish and keep a final message on screen.
    pub fn finish_with_message(&self, msg: impl Into<String>) {
        self.bar.finish_with_message(msg.into());
    }

    /// Finish and remove the indicator from the terminal.
    pub fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }
}

fn download_style() -> IndicatifStyle {
    IndicatifStyle::default_bar()
        .template("{prefix:.bold.cyan} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
        .unwrap()
        .progress_chars("━╸━")
}

fn spinner_style() -> IndicatifStyle {
    IndicatifStyle::default_spinner()
        .template("{prefix:.bold} {spinner:.cyan} {msg}")
        .unwrap()
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
}
