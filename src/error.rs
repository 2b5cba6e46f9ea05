//! Unified error hierarchy for coachrs
//!
//! The analysis engine itself degrades to neutral results instead of failing,
//! so errors only surface at the edges: parsing enumerations from free-form
//! input, loading configuration, and reading files in the CLI.

use thiserror::Error;

/// Top-level error type for all coachrs operations
#[derive(Debug, Error)]
pub enum CoachError {
    /// Data validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unknown value for a closed enumeration (level, category, muscle, ...)
    #[error("Unknown {kind}: {value}")]
    Parse { kind: &'static str, value: String },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for coachrs operations
pub type Result<T> = std::result::Result<T, CoachError>;

impl CoachError {
    /// Shorthand for an unknown enumeration value
    pub fn parse(kind: &'static str, value: impl Into<String>) -> Self {
        CoachError::Parse {
            kind,
            value: value.into(),
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoachError::Validation(_) => ErrorSeverity::Warning,
            CoachError::Parse { .. } => ErrorSeverity::Warning,
            CoachError::Configuration(_) => ErrorSeverity::Error,
            CoachError::Io(_) => ErrorSeverity::Error,
            CoachError::Serialization(_) => ErrorSeverity::Error,
            CoachError::Internal(_) => ErrorSeverity::Critical,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            CoachError::Parse { kind, value } => {
                format!(
                    "'{}' is not a recognised {}. Check the spelling or the catalog data.",
                    value, kind
                )
            }
            CoachError::Configuration(reason) => {
                format!("The engine configuration is invalid: {}", reason)
            }
            CoachError::Serialization(err) => {
                format!("Input data could not be read as JSON: {}", err)
            }
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Critical system error requiring immediate attention
    Critical,
    /// Error that prevents operation but system can continue
    Error,
    /// Warning that doesn't prevent operation
    Warning,
}

impl ErrorSeverity {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            ErrorSeverity::Critical => tracing::Level::ERROR,
            ErrorSeverity::Error => tracing::Level::ERROR,
            ErrorSeverity::Warning => tracing::Level::WARN,
        }
    }
}
