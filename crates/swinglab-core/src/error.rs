//! Error types for the SwingLab core crate.
//!
//! Error handling uses [`thiserror`] for automatic `Display` and `Error`
//! trait implementations. Every condition at this layer is recoverable by
//! design: the engine must never take down a live capture session, so
//! validation failures abort only the offending call.

use thiserror::Error;

/// A specialized `Result` type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised while constructing or validating core data types.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CoreError {
    /// Confidence value outside the valid [0.0, 1.0] range
    #[error("Confidence must be in [0.0, 1.0], got {value}")]
    InvalidConfidence {
        /// The rejected value
        value: f32,
    },

    /// Validation error for input data
    #[error("Validation error: {message}")]
    Validation {
        /// Description of what validation failed
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error
        message: String,
    },
}

impl CoreError {
    /// Creates a new validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates a new configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Returns `true` if this error is recoverable.
    ///
    /// All core errors abort only the call that produced them, never a
    /// whole session.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::InvalidConfidence { .. } | Self::Validation { .. } => true,
            Self::Configuration { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_confidence_display() {
        let err = CoreError::InvalidConfidence { value: 1.5 };
        assert!(err.to_string().contains("1.5"));
    }

    #[test]
    fn test_validation_helper() {
        let err = CoreError::validation("frame index must increase");
        assert!(err.to_string().contains("frame index"));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_configuration_not_recoverable() {
        let err = CoreError::configuration("empty landmark vocabulary");
        assert!(!err.is_recoverable());
    }
}
