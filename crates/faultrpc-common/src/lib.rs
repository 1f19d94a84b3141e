//! FaultRPC Common Types and Transport
//!
//! This crate provides the protocol definitions and framed TCP transport
//! shared by the FaultRPC server, client and CLI.
//!
//! # Overview
//!
//! FaultRPC is a resiliency test server: it injects configurable latency and
//! failure outcomes into unary, server-streamed, client-streamed and
//! bidirectional calls so that client code can be exercised against
//! timeouts, retries and cancellation. This crate contains:
//!
//! - **Protocol Layer**: fault requests and responses, call status codes,
//!   metadata and the per-call wire frames
//! - **Transport Layer**: length-prefixed JSON framing over tokio streams
//!
//! # Architecture
//!
//! - **Transport**: TCP, one connection per call
//! - **Serialization**: JSON
//! - **Message Format**: `[4-byte length prefix as u32 big-endian] + [JSON data]`
//! - **Max Frame Size**: 16 MiB
//!
//! # Components
//!
//! - [`protocol`] - Requests, responses, statuses, metadata and frames
//! - [`transport`] - Codec, framing and TCP connection helpers
//!
//! # Example
//!
//! ```
//! use faultrpc_common::{FaultRequest, Status, StatusCode};
//!
//! // Ask for a 10-50ms delay and either success or NOT_FOUND
//! let request = FaultRequest::new(vec![0, 5]).with_delay_ms(10, 50);
//!
//! let status = Status::new(StatusCode::NotFound, "Generated by server");
//! assert!(!status.is_ok());
//! ```

pub mod protocol;
pub mod transport;

pub use protocol::*;
