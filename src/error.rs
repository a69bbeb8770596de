//! Error types for pixel retrieval

use crate::io::PlaneSelector;
use thiserror::Error;

/// Errors reported by a pixel-store collaborator (client or raw data source)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("{0}")]
    Other(String),
}

/// Main error type for pixel retrieval operations
#[derive(Error, Debug)]
pub enum PixelError {
    /// The raw data handle could not be created.
    #[error("Cannot acquire raw data handle: {0}")]
    ResourceAcquisition(#[source] SourceError),

    /// A tile fetch was rejected by the raw data source.
    #[error("Cannot read tile at {plane} (x={x}, y={y}, {width}x{height}): {source}")]
    Access {
        plane: PlaneSelector,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
        #[source]
        source: SourceError,
    },

    /// Plane metadata could not be retrieved.
    #[error("Cannot retrieve planes info: {0}")]
    PlanesInfo(#[source] SourceError),

    #[error("Invalid tile: {0}")]
    InvalidTile(String),

    #[error("Invalid bytes per pixel: {0}")]
    InvalidBytesPerPixel(usize),

    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),

    #[error("Out of bounds: {0}")]
    OutOfBounds(String),

    #[error("Unsupported pixel type: {0}")]
    UnsupportedPixelType(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PixelError {
    /// Whether this error came from the raw data source during a read.
    pub fn is_access_failure(&self) -> bool {
        matches!(self, PixelError::Access { .. } | PixelError::PlanesInfo(_))
    }
}

/// Specialized Result type for pixel retrieval operations
pub type Result<T> = std::result::Result<T, PixelError>;

impl From<serde_json::Error> for PixelError {
    fn from(err: serde_json::Error) -> Self {
        PixelError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_error_message() {
        let err = PixelError::Access {
            plane: PlaneSelector::new(1, 2, 3),
            x: 5000,
            y: 0,
            width: 2000,
            height: 1,
            source: SourceError::Connection("reset by peer".to_string()),
        };
        let message = err.to_string();
        assert!(message.contains("z=1, t=2, c=3"));
        assert!(message.contains("2000x1"));
        assert!(message.contains("reset by peer"));
        assert!(err.is_access_failure());
    }

    #[test]
    fn test_acquisition_is_not_access_failure() {
        let err = PixelError::ResourceAcquisition(SourceError::Unavailable("facility".into()));
        assert!(!err.is_access_failure());
        assert!(err.to_string().starts_with("Cannot acquire raw data handle"));
    }
}
