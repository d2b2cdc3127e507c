//! Repository error taxonomy.
//!
//! Every repository failure is one of five kinds. Unknown entity kinds pass
//! through from the schema registry unchanged.

use crm_record_client::ClientError;
use crm_schema::SchemaError;
use thiserror::Error;

/// Error category for structured logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The record client has no credentials yet
    ClientUnavailable,
    /// The backend call failed or answered `success: false`
    Transport,
    /// Per-field rejection, or nothing left to create after coercion
    Validation,
    /// Lookup by id returned nothing
    NotFound,
    /// Backend refused a delete
    DeleteFailed,
    UnknownEntity,
}

impl ErrorKind {
    /// Machine-readable code for logging
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClientUnavailable => "CLIENT_UNAVAILABLE",
            Self::Transport => "TRANSPORT_ERROR",
            Self::Validation => "VALIDATION_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::DeleteFailed => "DELETE_FAILED",
            Self::UnknownEntity => "UNKNOWN_ENTITY_KIND",
        }
    }
}

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("record client is not initialized")]
    ClientUnavailable,

    /// `message` is the backend's own text, unmodified.
    #[error("{message}")]
    Transport {
        message: String,
        #[source]
        source: Option<ClientError>,
    },

    #[error("{message}")]
    Validation { message: String },

    #[error("{kind} {id} not found")]
    NotFound { kind: String, id: i64 },

    #[error("delete failed: {reason}")]
    DeleteFailed { reason: String },

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl RepositoryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ClientUnavailable => ErrorKind::ClientUnavailable,
            Self::Transport { .. } => ErrorKind::Transport,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::DeleteFailed { .. } => ErrorKind::DeleteFailed,
            Self::Schema(_) => ErrorKind::UnknownEntity,
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            source: None,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

impl From<ClientError> for RepositoryError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::NotInitialized => Self::ClientUnavailable,
            other => Self::Transport {
                message: other.server_message(),
                source: Some(other),
            },
        }
    }
}

/// Result type for repository operations
pub type Result<T> = std::result::Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_client_errors_map_to_taxonomy() {
        let err = RepositoryError::from(ClientError::NotInitialized);
        assert_eq!(err.kind(), ErrorKind::ClientUnavailable);

        let err = RepositoryError::from(ClientError::Status {
            url: "https://records.example.com/tables/deal_c/records".to_string(),
            status: 400,
            message: "Invalid stage".to_string(),
        });
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.to_string(), "Invalid stage");
    }

    #[test]
    fn test_schema_error_passes_through() {
        let err = RepositoryError::from(SchemaError::unknown_kind("invoice"));
        assert_eq!(err.kind().as_str(), "UNKNOWN_ENTITY_KIND");
        assert_eq!(err.to_string(), SchemaError::unknown_kind("invoice").to_string());
    }
}
