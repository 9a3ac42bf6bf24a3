//! Unified error types for the user board.

use thiserror::Error;

/// Unified error type for the user board.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration values failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Storage error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Backend client error.
    #[error("client error: {0}")]
    Client(#[from] ClientError),

    /// Metrics recorder installation failed.
    #[error("metrics error: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by the user store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The startup connection has not been established yet.
    #[error("database connection not established")]
    NotConnected,

    /// The query failed in the database or driver.
    #[error("{0}")]
    Query(#[from] sqlx::Error),

    /// The store rejected the row; used by non-SQL stores.
    #[error("{0}")]
    Rejected(String),
}

/// Errors raised by the HTTP client talking to the backend.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The request could not be sent or the body not decoded.
    #[error("{0}")]
    Request(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("request failed with status code {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body text.
        body: String,
    },

    /// The backend base URL is invalid.
    #[error("invalid backend url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, AppError>;
