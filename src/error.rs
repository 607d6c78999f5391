//! Error taxonomy shared by the store, the reconciler and the HTTP surface

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GalleryError>;

#[derive(Debug, Error)]
pub enum GalleryError {
    #[error("Image not found")]
    NotFound(i64),

    #[error("Invalid rating value {0}. Must be an integer between 0 and 5.")]
    InvalidRating(i64),

    #[error("Missing rating value. Must be an integer between 0 and 5.")]
    MissingRating,

    #[error("{0}")]
    InvalidRequest(String),

    #[error("database error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("failed to remove {}: {source}", .path.display())]
    FileRemoval {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("image root is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("filesystem walk error: {0}")]
    Scan(#[from] walkdir::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("background task failed: {0}")]
    Task(String),
}

impl GalleryError {
    /// Client errors are reported verbatim; everything else is a server fault
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            GalleryError::NotFound(_)
                | GalleryError::InvalidRating(_)
                | GalleryError::MissingRating
                | GalleryError::InvalidRequest(_)
        )
    }
}
