//! Schema registry errors

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("unknown entity kind: {kind}")]
    UnknownEntityKind { kind: String },
}

impl SchemaError {
    /// Machine-readable code for logging
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnknownEntityKind { .. } => "UNKNOWN_ENTITY_KIND",
        }
    }

    pub fn unknown_kind(kind: impl Into<String>) -> Self {
        Self::UnknownEntityKind { kind: kind.into() }
    }
}

/// Result type for schema lookups
pub type Result<T> = std::result::Result<T, SchemaError>;
