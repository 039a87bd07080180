//! Error types for the domain layer.

use thiserror::Error;

/// Errors raised by catalog and session operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Mode '{0}' not found in catalog")]
    ModeNotFound(String),

    #[error("Invalid mode definition: {0}")]
    InvalidModeDefinition(String),

    #[error("Phase {0} not found in mode")]
    PhaseNotFound(u32),
}

impl DomainError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        DomainError::EmptyField {
            field: field.into(),
        }
    }

    /// Creates an invalid mode definition error.
    pub fn invalid_mode(reason: impl Into<String>) -> Self {
        DomainError::InvalidModeDefinition(reason.into())
    }
}
