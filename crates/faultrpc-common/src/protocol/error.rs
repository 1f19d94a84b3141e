use thiserror::Error;

use super::status::Status;

#[derive(Error, Debug)]
pub enum FaultRpcError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    #[error("Frame too large: {size} bytes (max {max} bytes)")]
    FrameTooLarge { size: usize, max: usize },

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Call failed: {0}")]
    Status(Status),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<std::net::AddrParseError> for FaultRpcError {
    fn from(err: std::net::AddrParseError) -> Self {
        FaultRpcError::Connection(err.to_string())
    }
}

impl FaultRpcError {
    /// Returns the status carried by a failed call, if this error is one.
    pub fn status(&self) -> Option<&Status> {
        match self {
            FaultRpcError::Status(status) => Some(status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, FaultRpcError>;
