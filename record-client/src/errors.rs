//! Transport-level errors.
//!
//! A `success: false` answer from the store is NOT an error at this layer;
//! it arrives as a normal response and the repository interprets it.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// No credentials yet (e.g. before sign-in)
    #[error("record client is not initialized")]
    NotInitialized,

    #[error("invalid client configuration: {message}")]
    Config { message: String },

    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}: {message}")]
    Status {
        url: String,
        status: u16,
        message: String,
    },

    #[error("invalid response from {url}: {message}")]
    InvalidResponse { url: String, message: String },
}

impl ClientError {
    /// Machine-readable code for logging
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotInitialized => "NOT_INITIALIZED",
            Self::Config { .. } => "CONFIG_ERROR",
            Self::Http { .. } => "HTTP_ERROR",
            Self::Status { .. } => "STATUS_ERROR",
            Self::InvalidResponse { .. } => "INVALID_RESPONSE",
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Message suitable for surfacing to a user verbatim.
    ///
    /// For HTTP status failures this is the server's own message rather
    /// than the full display string.
    pub fn server_message(&self) -> String {
        match self {
            Self::Status { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Result type for record client calls
pub type Result<T> = std::result::Result<T, ClientError>;
