//! Error types and handling.

use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Malformed, missing or inverted date range
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    /// Source row whose dates or times cannot be read
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// Attendance source or employee directory could not be reached
    #[error("Data source unavailable: {0}")]
    DataSourceUnavailable(String),

    /// A record could not be written to the export
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Data parsing error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for AppError
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// Create an invalid range error with message
    pub fn invalid_range(msg: impl Into<String>) -> Self {
        Self::InvalidRange(msg.into())
    }

    /// Create an invalid record error with message
    pub fn invalid_record(msg: impl Into<String>) -> Self {
        Self::InvalidRecord(msg.into())
    }

    /// Create a data source unavailable error with message
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::DataSourceUnavailable(msg.into())
    }

    /// Create a serialization error with message
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// Create a parse error with message
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a config error with message
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether the user can fix this by correcting their input.
    ///
    /// These are shown as validation messages and never retried.
    pub fn is_user_correctable(&self) -> bool {
        matches!(self, Self::InvalidRange(_) | Self::InvalidRecord(_))
    }
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for AppError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_correctable_classes() {
        assert!(AppError::invalid_range("start after end").is_user_correctable());
        assert!(AppError::invalid_record("bad time").is_user_correctable());
        assert!(!AppError::unavailable("connection refused").is_user_correctable());
        assert!(!AppError::serialization("bad row").is_user_correctable());
    }

    #[test]
    fn test_display_messages() {
        let err = AppError::unavailable("timed out");
        assert_eq!(err.to_string(), "Data source unavailable: timed out");
    }
}
