//! Error types for earshot.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EarshotError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Audio capture errors
    #[error("Audio device not found: {device}")]
    AudioDeviceNotFound { device: String },

    #[error("Audio capture failed: {message}")]
    AudioCapture { message: String },

    // Segment persistence errors
    #[error("Segment audio error: {message}")]
    SegmentAudio { message: String },

    // External service errors
    #[error("Transcription failed: {message}")]
    Transcription { message: String },

    #[error("Speaker identification failed: {message}")]
    Identification { message: String },

    #[error("Profile registry error: {message}")]
    ProfileRegistry { message: String },

    // Session socket errors
    #[error("Socket error: {message}")]
    Socket { message: String },

    #[error("Session protocol error: {message}")]
    Protocol { message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, EarshotError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_config_file_not_found_display() {
        let error = EarshotError::ConfigFileNotFound {
            path: "/path/to/earshot.toml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found at /path/to/earshot.toml"
        );
    }

    #[test]
    fn test_config_invalid_value_display() {
        let error = EarshotError::ConfigInvalidValue {
            key: "audio.sample_rate".to_string(),
            message: "must be positive".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid configuration value for audio.sample_rate: must be positive"
        );
    }

    #[test]
    fn test_audio_device_not_found_display() {
        let error = EarshotError::AudioDeviceNotFound {
            device: "default".to_string(),
        };
        assert_eq!(error.to_string(), "Audio device not found: default");
    }

    #[test]
    fn test_audio_capture_display() {
        let error = EarshotError::AudioCapture {
            message: "buffer overflow".to_string(),
        };
        assert_eq!(error.to_string(), "Audio capture failed: buffer overflow");
    }

    #[test]
    fn test_segment_audio_display() {
        let error = EarshotError::SegmentAudio {
            message: "failed to finalize container".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Segment audio error: failed to finalize container"
        );
    }

    #[test]
    fn test_transcription_display() {
        let error = EarshotError::Transcription {
            message: "service returned status 503".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Transcription failed: service returned status 503"
        );
    }

    #[test]
    fn test_identification_display() {
        let error = EarshotError::Identification {
            message: "connection refused".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Speaker identification failed: connection refused"
        );
    }

    #[test]
    fn test_profile_registry_display() {
        let error = EarshotError::ProfileRegistry {
            message: "invalid JSON".to_string(),
        };
        assert_eq!(error.to_string(), "Profile registry error: invalid JSON");
    }

    #[test]
    fn test_socket_display() {
        let error = EarshotError::Socket {
            message: "bind failed".to_string(),
        };
        assert_eq!(error.to_string(), "Socket error: bind failed");
    }

    #[test]
    fn test_other_display() {
        let error = EarshotError::Other("unexpected error".to_string());
        assert_eq!(error.to_string(), "unexpected error");
    }

    #[test]
    fn test_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error: EarshotError = io_error.into();
        assert!(error.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_toml_error() {
        let toml_str = "invalid = toml = syntax";
        let toml_error = toml::from_str::<toml::Value>(toml_str).unwrap_err();
        let error: EarshotError = toml_error.into();
        assert!(error.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_result() -> Result<i32> {
            Ok(42)
        }
        assert_eq!(returns_result().unwrap(), 42);

        fn returns_error() -> Result<i32> {
            Err(EarshotError::Other("test error".to_string()))
        }
        assert!(returns_error().is_err());
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<EarshotError>();
        assert_sync::<EarshotError>();
    }

    #[test]
    fn test_error_debug_format() {
        let error = EarshotError::Protocol {
            message: "unexpected token".to_string(),
        };
        let debug_str = format!("{:?}", error);
        assert!(debug_str.contains("Protocol"));
        assert!(debug_str.contains("unexpected token"));
    }
}
