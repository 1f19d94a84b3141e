//! Wire frames for a single call.
//!
//! Each TCP connection carries exactly one call. The client opens it with
//! [`ClientFrame::Open`], streams zero or more requests, and either
//! half-closes or cancels. The server answers with optional headers, zero or
//! more messages and exactly one terminal [`ServerFrame::Status`].
//!
//! ```text
//! client: open -> message* -> (half_close | cancel)
//! server: headers? -> message* -> status
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use super::metadata::Metadata;
use super::requests::FaultRequest;
use super::responses::FaultResponse;
use super::status::Status;

/// Interaction pattern of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallShape {
    /// One request, one response
    Unary,
    /// One request, an unbounded stream of responses
    ServerStream,
    /// A stream of requests, one summary response
    ClientStream,
    /// Interleaved request and response streams
    BidiStream,
}

impl CallShape {
    pub fn as_str(self) -> &'static str {
        match self {
            CallShape::Unary => "unary",
            CallShape::ServerStream => "server_stream",
            CallShape::ClientStream => "client_stream",
            CallShape::BidiStream => "bidi_stream",
        }
    }
}

impl fmt::Display for CallShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which service variant handles the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    /// Plain fault injection
    #[default]
    Resiliency,
    /// Fault injection plus correlation metadata exchange
    ResiliencyWithMetadata,
}

/// Frames sent from client to server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    /// Starts the call. Must be the first frame on the connection.
    Open {
        service: ServiceKind,
        shape: CallShape,
        #[serde(default)]
        metadata: Metadata,
    },
    Message { request: FaultRequest },
    /// No more requests will follow
    HalfClose,
    /// Abandon the call
    Cancel,
}

/// Frames sent from server to client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    Headers { metadata: Metadata },
    Message { response: FaultResponse },
    /// Terminal frame; the server closes the connection after sending it
    Status { status: Status },
}
