//! pmsup - keeps a locally running media server on the vendor's latest
//! release.
//!
//! One run of the tool is a linear workflow:
//!
//! 1. Load the TOML configuration ([`config`])
//! 2. Read the running server's version from its management endpoint
//!    ([`server`])
//! 3. Read the vendor release feed for the configured distro/build
//!    ([`feed`])
//! 4. Compare the two version strings ([`upgrade::upgrade_available`])
//! 5. Download and checksum-verify the artifact, with bounded retries
//!    ([`upgrade::download`])
//! 6. Install it through the host package manager when running with
//!    elevated privileges ([`upgrade::install`])
//! 7. Archive superseded package files ([`upgrade::archive`])
//! 8. Push the outcome to a notification service ([`notify`])
//!
//! Steps 1-3 are fatal when they fail; steps 5 and 6 end the run with a
//! reported, notified failure; steps 7 and 8 are best effort. See
//! [`core::UpdaterError`] for the taxonomy.
//!
//! The library crate exists for the binary in `main.rs` and for the
//! integration tests; it is not a published API.

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod feed;
pub mod notify;
pub mod server;
pub mod upgrade;
pub mod utils;

pub use config::Config;
pub use core::UpdaterError;
pub use feed::ReleaseInfo;
pub use server::ServerState;
pub use upgrade::{UpgradeOutcome, upgrade_available};
