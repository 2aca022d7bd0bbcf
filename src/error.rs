//! Error types and handling for the loss library.

use thiserror::Error;

/// The main error type for the loss library.
#[derive(Error, Debug)]
pub enum LossError {
    /// Dimension mismatch between prediction, label, or embedding matrices
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: String, actual: String },

    /// Invalid parameter errors
    #[error("Invalid parameter: {parameter} = {value}, reason: {reason}")]
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },

    /// Numerical computation errors
    #[error("Numerical error: {message}")]
    Numerical { message: String },

    /// Malformed input data errors
    #[error("Data error: {message}")]
    Data { message: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Errors during settings serialization/deserialization
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },

    /// Errors reading settings from disk
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

/// Result type alias for the loss library.
pub type Result<T> = std::result::Result<T, LossError>;

impl LossError {
    /// Create a new dimension mismatch error
    pub fn dimension_mismatch<S: Into<String>>(expected: S, actual: S) -> Self {
        Self::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a new invalid parameter error
    pub fn invalid_parameter<S: Into<String>>(parameter: S, value: S, reason: S) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a new numerical error
    pub fn numerical<S: Into<String>>(message: S) -> Self {
        Self::Numerical {
            message: message.into(),
        }
    }

    /// Create a new data error
    pub fn data<S: Into<String>>(message: S) -> Self {
        Self::Data {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Numerical { .. })
    }

    /// Get the error category
    pub fn category(&self) -> &'static str {
        match self {
            Self::DimensionMismatch { .. } => "DimensionMismatch",
            Self::InvalidParameter { .. } => "InvalidParameter",
            Self::Numerical { .. } => "Numerical",
            Self::Data { .. } => "Data",
            Self::Configuration { .. } => "Configuration",
            Self::Serialization { .. } => "Serialization",
            Self::Io { .. } => "IO",
        }
    }
}
