//! Global constants used throughout the pmsup codebase.
//!
//! Endpoint locations, environment variable names, header names, and
//! default values live here so they are discoverable in one place instead
//! of being scattered as magic strings across modules.

/// Application name reported to the push-notification service.
pub const APP_NAME: &str = "PMS Updater";

/// Prowl "add" endpoint used for push notifications.
pub const PROWL_ADD_URL: &str = "https://api.prowlapp.com/publicapi/add";

/// HTTP header carrying the server authentication token.
pub const TOKEN_HEADER: &str = "X-Plex-Token";

/// Query parameter value selecting the subscriber release channel.
pub const PLEXPASS_CHANNEL: &str = "plexpass";

/// Environment variable overriding the configuration file location.
pub const CONFIG_ENV_VAR: &str = "PMSUP_CONFIG";

/// Environment variable disabling progress bars when set to any value.
pub const NO_PROGRESS_ENV_VAR: &str = "PMSUP_NO_PROGRESS";

/// Environment variable overriding the notification endpoint, for
/// self-hosted relays.
pub const NOTIFY_URL_ENV_VAR: &str = "PMSUP_PROWL_URL";

/// Directory component under the user config dir holding `config.toml`.
pub const CONFIG_DIR_NAME: &str = "pmsup";

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Default per-request HTTP timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default bound on download attempts before the run gives up.
pub const DEFAULT_DOWNLOAD_ATTEMPTS: u32 = 3;

/// Fixed delay between download attempts in milliseconds.
pub const DOWNLOAD_RETRY_DELAY_MS: u64 = 2_000;

/// Default host package manager used to install the artifact.
pub const DEFAULT_PACKAGE_MANAGER: &str = "dpkg";

/// Default file-name prefix identifying server package files in the
/// download directory. Files matching this prefix are archive candidates.
pub const DEFAULT_PACKAGE_PREFIX: &str = "plexmediaserver";

/// User agent sent on all outgoing HTTP requests.
pub const USER_AGENT: &str = concat!("pmsup/", env!("CARGO_PKG_VERSION"));
