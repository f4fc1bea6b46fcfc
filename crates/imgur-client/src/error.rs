//! Error types for Imgur client operations

use thiserror::Error;

use crate::config::ConfigError;
use crate::types::ErrorData;

/// Result type alias for Imgur client operations
pub type Result<T> = std::result::Result<T, ImgurError>;

/// Errors that can occur during Imgur client operations
#[derive(Error, Debug)]
pub enum ImgurError {
    /// Network or connection failure
    #[error("HTTP transport failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Request could not be constructed
    #[error("Failed to encode request: {0}")]
    Encoding(String),

    /// Response body is not valid JSON or has an unexpected shape
    #[error("Failed to decode response: {0}")]
    Decoding(String),

    /// Configuration source missing or malformed
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Request rejected before sending
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Remote service rejected a delete
    #[error("Imgur returned {status}: {}", .error.error)]
    Remote { status: u16, error: ErrorData },

    /// Deadline elapsed
    #[error("Request timed out")]
    Timeout,

    /// Cancelled by the caller
    #[error("Request cancelled")]
    Cancelled,
}

impl ImgurError {
    /// Map a reqwest error, keeping timeouts distinct from other transport failures
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_builder() {
            Self::Encoding(err.to_string())
        } else {
            Self::Transport(err)
        }
    }

    /// Whether the error happened before or during the network exchange
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout)
    }
}
