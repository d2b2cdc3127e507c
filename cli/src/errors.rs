//! CLI error types.

use std::path::PathBuf;

use crm_record_client::ClientError;
use crm_repository::RepositoryError;
use crm_schema::SchemaError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config: {message}")]
    Invalid { message: String },
}

impl ConfigError {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read { .. } => "CONFIG_READ_ERROR",
            Self::Parse { .. } => "CONFIG_PARSE_ERROR",
            Self::Invalid { .. } => "CONFIG_INVALID",
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Malformed command-line value
    #[error("{0}")]
    Usage(String),

    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode output: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Machine-readable code printed alongside the message
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Config(e) => e.as_str(),
            Self::Schema(e) => e.as_str(),
            Self::Client(e) => e.as_str(),
            Self::Repository(e) => e.kind().as_str(),
            Self::Usage(_) => "USAGE_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Json(_) => "ENCODE_ERROR",
        }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }
}

pub type Result<T> = std::result::Result<T, CliError>;
