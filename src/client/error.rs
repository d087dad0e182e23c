use crate::services::compressor::CompressionError;
use thiserror::Error;

/// Message shown when a transport failure leaves nothing better to say
pub const GENERIC_ERROR: &str = "An error occurred";

/// Message shown when the server fails without a readable JSON error
pub const COMPRESSION_FAILED: &str = "Compression failed";

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("{0}")]
    Validation(String),

    #[error("Compressed file is {size} bytes, above the {limit} byte upload limit")]
    SizeExceeded { size: u64, limit: u64 },

    #[error("Local compression failed: {0}")]
    Processing(#[from] CompressionError),

    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("A compression is already in progress")]
    Busy,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Text the session surfaces to the user
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Network(_) => GENERIC_ERROR.to_string(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Network(err.to_string())
    }
}
