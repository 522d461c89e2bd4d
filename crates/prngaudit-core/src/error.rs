//! Error type shared by the analyzers and the data source adapters.
//!
//! Every failure is detected before any partial result is built, so a caller
//! either gets a complete report or one of these errors.

use thiserror::Error;

/// Failure of an analysis or of the data source feeding it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AuditError {
    /// A value is outside its domain (e.g. a p-value above 1.0).
    #[error("invalid input in {context}: got {value}, expected {expected}")]
    InvalidInput {
        context: String,
        value: String,
        expected: String,
    },

    /// The sequence is empty or too short for the requested computation.
    #[error("insufficient data for {context}: need {needed}, got {got}")]
    InsufficientData {
        context: String,
        needed: usize,
        got: usize,
    },

    /// A configuration parameter cannot be used.
    #[error("invalid configuration: {parameter} = {value}, expected {expected}")]
    InvalidConfiguration {
        parameter: String,
        value: String,
        expected: String,
    },

    /// The external data source did not deliver what was asked of it.
    #[error("data source '{source_name}' failed: {reason}")]
    UpstreamFailure { source_name: String, reason: String },
}

impl AuditError {
    pub fn invalid_input(
        context: impl Into<String>,
        value: impl ToString,
        expected: impl Into<String>,
    ) -> Self {
        Self::InvalidInput {
            context: context.into(),
            value: value.to_string(),
            expected: expected.into(),
        }
    }

    pub fn insufficient(context: impl Into<String>, needed: usize, got: usize) -> Self {
        Self::InsufficientData {
            context: context.into(),
            needed,
            got,
        }
    }

    pub fn invalid_config(
        parameter: impl Into<String>,
        value: impl ToString,
        expected: impl Into<String>,
    ) -> Self {
        Self::InvalidConfiguration {
            parameter: parameter.into(),
            value: value.to_string(),
            expected: expected.into(),
        }
    }

    pub fn upstream(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UpstreamFailure {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    /// Short, stable name of the error kind (used in JSON output and logs).
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput { .. } => "invalid_input",
            Self::InsufficientData { .. } => "insufficient_data",
            Self::InvalidConfiguration { .. } => "invalid_configuration",
            Self::UpstreamFailure { .. } => "upstream_failure",
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AuditError>;
