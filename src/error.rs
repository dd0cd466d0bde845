//! Error types for Lenstutor
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Lenstutor operations
///
/// This enum encompasses all possible errors that can occur during
/// configuration loading, provider interactions, image capture,
/// speech playback, and session persistence.
#[derive(Error, Debug)]
pub enum LenstutorError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Provider-related errors (API calls, missing credentials, etc.)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Image payload failed local validation (wrong encoding or too large)
    #[error("Invalid image data: {0}")]
    InvalidImage(String),

    /// Camera frame capture errors (no frame available, decode failure)
    #[error("Capture error: {0}")]
    Capture(String),

    /// Speech synthesis errors
    #[error("Speech error: {0}")]
    Speech(String),

    /// Session persistence errors (writes only; reads degrade to empty)
    #[error("Storage error: {0}")]
    Storage(String),

    /// A capture or query action was attempted while another is in flight
    #[error("A request is already in progress")]
    Busy,

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Image decode/encode errors
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Result type alias for Lenstutor operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = LenstutorError::Config("invalid format".to_string());
        assert_eq!(error.to_string(), "Configuration error: invalid format");
    }

    #[test]
    fn test_provider_error_display() {
        let error = LenstutorError::Provider("API timeout".to_string());
        assert_eq!(error.to_string(), "Provider error: API timeout");
    }

    #[test]
    fn test_invalid_image_error_display() {
        let error = LenstutorError::InvalidImage("image exceeds 4 MiB".to_string());
        assert_eq!(error.to_string(), "Invalid image data: image exceeds 4 MiB");
    }

    #[test]
    fn test_capture_error_display() {
        let error = LenstutorError::Capture("no frame available".to_string());
        assert_eq!(error.to_string(), "Capture error: no frame available");
    }

    #[test]
    fn test_speech_error_display() {
        let error = LenstutorError::Speech("synthesizer not found".to_string());
        assert_eq!(error.to_string(), "Speech error: synthesizer not found");
    }

    #[test]
    fn test_busy_error_display() {
        let error = LenstutorError::Busy;
        assert_eq!(error.to_string(), "A request is already in progress");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: LenstutorError = io_error.into();
        assert!(matches!(error, LenstutorError::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_str = "{invalid json}";
        let json_error = serde_json::from_str::<serde_json::Value>(json_str).unwrap_err();
        let error: LenstutorError = json_error.into();
        assert!(matches!(error, LenstutorError::Serialization(_)));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_str = "invalid: : yaml";
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>(yaml_str).unwrap_err();
        let error: LenstutorError = yaml_error.into();
        assert!(matches!(error, LenstutorError::Yaml(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<LenstutorError>();
    }
}
