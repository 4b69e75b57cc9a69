use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

/// Custom error types for the logo-keyer library
#[derive(Error, Debug)]
pub enum Error {
    /// Source image missing, unreadable, or not decodable
    #[error("Failed to read image {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Destination could not be encoded or written
    #[error("Failed to write image {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O operation error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File not found error
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Invalid configuration error
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Unsupported image format
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),
}
