//! Error types for anno

use thiserror::Error;

/// Result type alias for anno operations
pub type Result<T> = std::result::Result<T, AnnoError>;

/// Main error type for anno
///
/// Row-level problems (short rows, unmapped evidence, unknown entities) are
/// not errors; they are collected as diagnostics and parsing continues. An
/// `AnnoError` aborts the current session.
#[derive(Error, Debug)]
pub enum AnnoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid version format: {0}")]
    InvalidVersion(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid state: {0}")]
    State(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = AnnoError::Config("Split size must be greater than 0".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: Split size must be greater than 0"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.gaf");
        let err: AnnoError = io.into();
        assert!(matches!(err, AnnoError::Io(_)));
        assert!(err.to_string().contains("missing.gaf"));
    }
}
