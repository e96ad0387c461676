//! Configuration for the board sync service.

use std::env;
use std::time::Duration;

use crate::client::GITHUB_GRAPHQL_URL;

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 8080;
/// Default upstream request timeout, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
/// Default cap on inbound webhook bodies.
pub const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Board sync service configuration.
#[derive(Clone)]
pub struct Config {
    /// HTTP server port.
    pub port: u16,
    /// GitHub token for API calls.
    pub github_token: Option<String>,
    /// GitHub GraphQL endpoint.
    pub graphql_url: String,
    /// Organization login owning the board.
    pub organization: Option<String>,
    /// Board number within the organization.
    pub board_number: Option<u32>,
    /// Timeout applied to each GitHub API request.
    pub request_timeout: Duration,
    /// Largest webhook body accepted.
    pub max_body_bytes: usize,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("github_token", &self.github_token.as_ref().map(|_| "<redacted>"))
            .field("graphql_url", &self.graphql_url)
            .field("organization", &self.organization)
            .field("board_number", &self.board_number)
            .field("request_timeout", &self.request_timeout)
            .field("max_body_bytes", &self.max_body_bytes)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: env::var("BOARD_SYNC_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            github_token: env::var("GITHUB_TOKEN").ok().filter(|s| !s.is_empty()),
            graphql_url: env::var("GITHUB_GRAPHQL_URL")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| GITHUB_GRAPHQL_URL.to_string()),
            organization: env::var("BOARD_ORGANIZATION")
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            board_number: env::var("BOARD_NUMBER").ok().and_then(|s| s.trim().parse().ok()),
            request_timeout: Duration::from_secs(
                env::var("BOARD_SYNC_REQUEST_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            ),
            max_body_bytes: env::var("BOARD_SYNC_MAX_BODY_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_BODY_BYTES),
        }
    }
}

/// Settings required before the service can talk to a board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardTarget<'a> {
    /// GitHub token
    pub token: &'a str,
    /// Organization login
    pub organization: &'a str,
    /// Board number
    pub board_number: u32,
}

impl Config {
    /// Check that the board and credentials are configured.
    ///
    /// Returns the names of every missing variable.
    pub fn validate(&self) -> Result<BoardTarget<'_>, Vec<&'static str>> {
        match (&self.github_token, &self.organization, self.board_number) {
            (Some(token), Some(organization), Some(board_number)) => Ok(BoardTarget {
                token,
                organization,
                board_number,
            }),
            (token, organization, board_number) => {
                let mut missing = Vec::new();
                if token.is_none() {
                    missing.push("GITHUB_TOKEN");
                }
                if organization.is_none() {
                    missing.push("BOARD_ORGANIZATION");
                }
                if board_number.is_none() {
                    missing.push("BOARD_NUMBER");
                }
                Err(missing)
            }
        }
    }
}
