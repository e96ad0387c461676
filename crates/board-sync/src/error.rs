//! Error types for board synchronization.

use thiserror::Error;

/// Failure talking to the board's GraphQL API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// API answered with a non-success status
    #[error("API returned error status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, as text
        body: String,
    },

    /// GraphQL `errors` array was populated
    #[error("GraphQL errors: {0}")]
    GraphQl(String),

    /// Response carried neither data nor errors, or data was incomplete
    #[error("missing data in GraphQL response: {0}")]
    MissingData(&'static str),
}

/// A remote metadata or snapshot lookup failed.
#[derive(Debug, Error)]
#[error("failed to fetch {what}: {source}")]
pub struct FetchError {
    /// What was being fetched
    pub what: &'static str,
    /// Underlying API failure
    #[source]
    pub source: ApiError,
}

impl FetchError {
    /// Wrap an API error with the name of the lookup that failed.
    #[must_use]
    pub const fn new(what: &'static str, source: ApiError) -> Self {
        Self { what, source }
    }
}

/// A remote write failed.
#[derive(Debug, Error)]
#[error("failed to {what}: {source}")]
pub struct MutateError {
    /// The mutation being attempted
    pub what: &'static str,
    /// Underlying API failure
    #[source]
    pub source: ApiError,
}

impl MutateError {
    /// Wrap an API error with the name of the mutation that failed.
    #[must_use]
    pub const fn new(what: &'static str, source: ApiError) -> Self {
        Self { what, source }
    }
}

/// Inbound webhook body was not a valid event envelope.
#[derive(Debug, Error)]
#[error("failed to decode webhook payload: {0}")]
pub struct DecodeError(#[from] pub serde_json::Error);

/// Why a single sync action did not complete.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Lookup failed; the action was aborted before any mutation
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Write failed; not retried
    #[error(transparent)]
    Mutate(#[from] MutateError),

    /// The board or organization is missing something the action needs
    #[error("schema gap: {0}")]
    SchemaGap(String),
}
