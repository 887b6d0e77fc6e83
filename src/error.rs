//! Error types shared by the store adapters, the selector and the server.

use thiserror::Error;

/// Failure talking to the driver store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("store answered {status}: {body}")]
    Status { status: u16, body: String },
    #[error("store returned an unreadable document: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("malformed store data: {0}")]
    Malformed(String),
    #[error("concurrent update conflict on driver {0}")]
    Conflict(String),
    #[error("store worker failed: {0}")]
    Worker(String),
}

/// Outcome of a request that did not succeed.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A required input was missing or malformed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// Unknown driver on update, or no suitable driver on query.
    #[error("{0}")]
    NotFound(String),
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
}

/// A configuration variable that could not be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} has invalid value {value:?}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
    #[error("could not read seed file {path}: {source}")]
    Seed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("seed file {path} is not a driver list: {source}")]
    SeedFormat {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
