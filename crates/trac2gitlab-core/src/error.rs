//! Error types for trac2gitlab

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Cannot resolve user '{0}': fallback identity is not available")]
    ReferenceResolution(String),

    #[error("Cannot map {entity}: {reason}")]
    Mapping { entity: String, reason: String },

    #[error("Sink rejected {entity}: {reason}")]
    Persist { entity: String, reason: String },

    #[error("Unknown target version: {0}")]
    UnknownVersion(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn mapping(entity: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Mapping {
            entity: entity.into(),
            reason: reason.into(),
        }
    }

    pub fn persist(entity: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Error::Persist {
            entity: entity.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether this error aborts the whole run.
    ///
    /// Mapping and persist failures only cost the entity they occurred on.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::Mapping { .. } | Error::Persist { .. })
    }
}
