use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvertError {
    /// No renderer matches the declared MIME type or the file extension.
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    /// The input bytes are not what their declared type claims.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Layout or rasterization failed.
    #[error("Render error: {0}")]
    Render(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Rendering did not finish within {0:?}")]
    Timeout(Duration),

    #[error("File is too large: {size} bytes (limit {limit} bytes)")]
    TooLarge { size: u64, limit: u64 },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ConvertError {
    /// Whether the same input might succeed on another attempt.
    pub fn is_retriable(&self) -> bool {
        matches!(self, ConvertError::Render(_) | ConvertError::Timeout(_))
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;
