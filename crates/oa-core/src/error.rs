//! Error types for the oxidized-apple achievement integration

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the integration layer
#[derive(Error, Debug)]
pub enum IntegrationError {
    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),
}

/// Media staging and lifecycle errors
///
/// Every variant is recoverable: a failed operation leaves the
/// persisted slots untouched and returns control to the caller.
#[derive(Error, Debug)]
pub enum MediaError {
    #[error("Unreadable media image: {0}")]
    Unreadable(PathBuf),

    #[error("Unsupported container format: .{0}")]
    UnsupportedContainer(String),

    #[error("Drive rejected media image: {0}")]
    DriveRejected(PathBuf),

    #[error("Hardcore override declined: {0}")]
    HardcoreVetoed(String),
}

/// Result type alias for integration operations
pub type Result<T> = std::result::Result<T, IntegrationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MediaError::UnsupportedContainer("zip".to_string());
        assert_eq!(format!("{}", err), "Unsupported container format: .zip");

        let err = MediaError::Unreadable(PathBuf::from("/images/missing.dsk"));
        assert_eq!(
            format!("{}", err),
            "Unreadable media image: /images/missing.dsk"
        );
    }

    #[test]
    fn test_error_conversion() {
        let media_err = MediaError::HardcoreVetoed("load a new title".to_string());
        let err: IntegrationError = media_err.into();
        assert!(matches!(err, IntegrationError::Media(_)));

        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: IntegrationError = io_err.into();
        assert!(matches!(err, IntegrationError::Io(_)));
    }
}
