use thiserror::Error;

use crate::domain::validation::ValidationError;

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("{entity} '{key}' not found")]
    NotFound { entity: &'static str, key: String },

    #[error("{entity} '{key}' already exists")]
    AlreadyExists { entity: &'static str, key: String },

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("invalid cursor: {0}")]
    InvalidCursor(#[from] page_core::Error),

    #[error("bad request: {message}")]
    BadRequest { message: String },

    #[error("{dependency} failure: {message}")]
    Dependency {
        dependency: &'static str,
        message: String,
    },
}

impl DomainError {
    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            key: key.into(),
        }
    }

    pub fn already_exists(entity: &'static str, key: impl Into<String>) -> Self {
        Self::AlreadyExists {
            entity,
            key: key.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    pub fn store(e: impl std::fmt::Display) -> Self {
        Self::Dependency {
            dependency: "store",
            message: e.to_string(),
        }
    }

    pub fn objects(e: impl std::fmt::Display) -> Self {
        Self::Dependency {
            dependency: "object store",
            message: e.to_string(),
        }
    }

    pub fn model(e: impl std::fmt::Display) -> Self {
        Self::Dependency {
            dependency: "model",
            message: e.to_string(),
        }
    }
}

impl From<table_store::StoreError> for DomainError {
    fn from(e: table_store::StoreError) -> Self {
        match e {
            // Only a cursor can carry a start key short of index attributes.
            table_store::StoreError::InvalidStartKey(_) => {
                Self::InvalidCursor(page_core::Error::CursorInvalidKeys)
            }
            other => Self::store(other),
        }
    }
}
