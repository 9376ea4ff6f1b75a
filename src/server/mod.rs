//! Server state fetcher.
//!
//! Queries the locally running media server's management endpoint for its
//! current version and friendly name. The endpoint answers with an XML
//! document whose root element carries both values as attributes:
//!
//! ```xml
//! <MediaContainer version="1.32.8.7639-fb6452ebf" friendlyName="den">
//!   ...
//! </MediaContainer>
//! ```
//!
//! This is read exactly once per run. A failure here is fatal: without
//! the running version there is nothing to compare the feed against.

use crate::config::Config;
use crate::constants::{TOKEN_HEADER, USER_AGENT};
use crate::core::UpdaterError;
use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{debug, info};

/// Version and identity of the running server, read once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerState {
    /// Version string reported by the server.
    pub current_version: String,
    /// Human-readable server name, used in notifications.
    pub friendly_name: String,
}

/// Client for the server's local management endpoint.
pub struct ServerClient {
    client: reqwest::Client,
    host_url: String,
    token: String,
}

impl ServerClient {
    /// Build a client from the run configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.default.timeout))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client for server state fetch")?;

        Ok(Self {
            client,
            host_url: config.server.host_url.clone(),
            token: config.server.token.clone(),
        })
    }

    /// Fetch the current server state from the management endpoint.
    ///
    /// # Errors
    ///
    /// [`UpdaterError::ServerUnreachable`] for transport or HTTP status
    /// failures, [`UpdaterError::ServerStateInvalid`] when the document
    /// cannot be parsed. Both are fatal.
    pub async fn fetch_state(&self) -> Result<ServerState> {
        debug!("Fetching server state from {}", self.host_url);

        let response = self
            .client
            .get(&self.host_url)
            .header(TOKEN_HEADER, &self.token)
            .send()
            .await
            .map_err(|e| UpdaterError::ServerUnreachable {
                url: self.host_url.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpdaterError::ServerUnreachable {
                url: self.host_url.clone(),
                reason: format!("HTTP {status}"),
            }
            .into());
        }

        let body = response
            .text()
            .await
            .map_err(|e| UpdaterError::ServerUnreachable {
                url: self.host_url.clone(),
                reason: format!("failed to read response body: {e}"),
            })?;

        let state = parse_server_state(&body)?;
        info!(
            "Server '{}' is running version {}",
            state.friendly_name, state.current_version
        );
        Ok(state)
    }
}

/// Parse the management endpoint's XML document into a [`ServerState`].
pub(crate) fn parse_server_state(xml: &str) -> Result<ServerState, UpdaterError> {
    let doc = roxmltree::Document::parse(xml).map_err(|e| UpdaterError::ServerStateInvalid {
        reason: e.to_string(),
    })?;

    let root = doc.root_element();
    let attr = |name: &str| {
        root.attribute(name)
            .map(str::to_string)
            .ok_or_else(|| UpdaterError::ServerStateInvalid {
                reason: format!("missing '{name}' attribute on <{}>", root.tag_name().name()),
            })
    };

    Ok(ServerState {
        current_version: attr("version")?,
        friendly_name: attr("friendlyName")?,
    })
}
