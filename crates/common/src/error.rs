//! Common error types.

use thiserror::Error;

/// Main error type for the pixel studio engine.
#[derive(Error, Debug)]
pub enum StudioError {
    #[error("Malformed file: {0}")]
    MalformedFile(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

pub type StudioResult<T> = Result<T, StudioError>;

impl StudioError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedFile(msg.into())
    }

    pub fn image(msg: impl Into<String>) -> Self {
        Self::Image(msg.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidOperation(msg.into())
    }
}
