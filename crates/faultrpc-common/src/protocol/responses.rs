//! FaultRPC Response Types

use serde::{Deserialize, Serialize};

/// Text carried by every response the resiliency service generates.
pub const GENERATED_BY_SERVER: &str = "Generated by server";

/// A response message produced by a successful fault cycle.
///
/// The payload is intentionally opaque: clients exercising resiliency only
/// care whether a message arrived, not what it says.
///
/// # Example
///
/// ```
/// use faultrpc_common::protocol::FaultResponse;
///
/// let response = FaultResponse::generated();
/// assert_eq!(response.message, "Generated by server");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FaultResponse {
    pub message: String,
}

impl FaultResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The standard server-generated payload.
    pub fn generated() -> Self {
        Self::new(GENERATED_BY_SERVER)
    }

    /// Summary returned when a client-streamed call ends normally.
    pub fn received(count: u64) -> Self {
        Self::new(format!("Received {} requests from client", count))
    }
}
