//! Structured errors for API consumers
//!
//! Every failure carries a machine-readable code and a human-readable
//! message. The HTTP layer decides the status; this crate stays transport-free.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Standard error codes (machine-readable)
pub mod codes {
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const CONFLICT: &str = "CONFLICT";
    pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
    pub const METHOD_NOT_ALLOWED: &str = "METHOD_NOT_ALLOWED";
}

/// Kind of registry entity an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Category,
    Unit,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Category => write!(f, "category"),
            EntityKind::Unit => write!(f, "unit"),
        }
    }
}

/// Errors raised by validation, the registry and the conversion service
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConvertError {
    /// Missing or malformed required input
    #[error("{0}")]
    Validation(String),

    /// Unknown unit or category
    #[error("{kind} '{name}' not found")]
    NotFound { kind: EntityKind, name: String },

    /// Duplicate unit or category name
    #[error("{kind} '{name}' already exists")]
    Conflict { kind: EntityKind, name: String },

    /// Backing store failed to read or persist
    #[error("storage failure: {0}")]
    Storage(String),
}

impl ConvertError {
    pub fn validation(message: impl Into<String>) -> Self {
        ConvertError::Validation(message.into())
    }

    pub fn missing_field(field: &str) -> Self {
        ConvertError::Validation(format!("'{}' is required", field))
    }

    pub fn unknown_unit(name: impl Into<String>) -> Self {
        ConvertError::NotFound { kind: EntityKind::Unit, name: name.into() }
    }

    pub fn unknown_category(name: impl Into<String>) -> Self {
        ConvertError::NotFound { kind: EntityKind::Category, name: name.into() }
    }

    pub fn duplicate_unit(name: impl Into<String>) -> Self {
        ConvertError::Conflict { kind: EntityKind::Unit, name: name.into() }
    }

    pub fn duplicate_category(name: impl Into<String>) -> Self {
        ConvertError::Conflict { kind: EntityKind::Category, name: name.into() }
    }

    pub fn storage(details: impl std::fmt::Display) -> Self {
        ConvertError::Storage(details.to_string())
    }

    /// Machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            ConvertError::Validation(_) => codes::VALIDATION_ERROR,
            ConvertError::NotFound { .. } => codes::NOT_FOUND,
            ConvertError::Conflict { .. } => codes::CONFLICT,
            ConvertError::Storage(_) => codes::STORAGE_ERROR,
        }
    }

    /// True when the caller sent something wrong, false for server-side failures
    pub fn is_client_error(&self) -> bool {
        !matches!(self, ConvertError::Storage(_))
    }
}

/// Wire representation of an error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    pub status: u16,
}

impl ErrorBody {
    pub fn new(err: &ConvertError, status: u16) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
            status,
        }
    }
}
