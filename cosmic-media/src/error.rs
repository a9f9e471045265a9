//! Upload pipeline errors

use std::path::PathBuf;
use thiserror::Error;

/// Result type for the upload pipeline
pub type Result<T> = std::result::Result<T, MediaError>;

#[derive(Debug, Error)]
pub enum MediaError {
    /// Extension or MIME type outside the accepted image set
    #[error("Only image files are allowed (jpeg, jpg, png, gif, webp, avif, svg)")]
    UnsupportedType,

    #[error("File is too large. Maximum size is {max_mb} MB")]
    TooLarge { max_mb: usize },

    /// Filename with path separators or traversal components
    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    /// Neither decoder could read the input
    #[error("Image decode failed: {0}")]
    Decode(String),

    #[error("Image encode failed: {0}")]
    Encode(String),

    /// Remote segmentation failed or produced unusable output
    #[error("Segmentation failed: {0}")]
    Segmentation(String),

    /// The authoritative local write failed
    #[error("Failed to save image to {path}: {source}")]
    LocalWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Blocking task panicked or was cancelled
    #[error("Worker task failed: {0}")]
    Task(String),

    #[error(transparent)]
    Common(#[from] cosmic_common::Error),
}

impl From<image::ImageError> for MediaError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::Encoding(e) => MediaError::Encode(e.to_string()),
            other => MediaError::Decode(other.to_string()),
        }
    }
}

impl From<tokio::task::JoinError> for MediaError {
    fn from(err: tokio::task::JoinError) -> Self {
        MediaError::Task(err.to_string())
    }
}
