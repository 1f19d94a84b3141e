//! FaultRPC Transport Layer
//!
//! This module provides the framed TCP transport every call runs over.
//!
//! # Architecture
//!
//! - **Transport**: one TCP connection per call
//! - **Codec**: JSON serialization of [`ClientFrame`](crate::protocol::ClientFrame)
//!   and [`ServerFrame`](crate::protocol::ServerFrame)
//! - **Wire Format**: `[4-byte length prefix as u32 big-endian] + [JSON data]`
//!
//! # Components
//!
//! - **[`JsonCodec`]**: Encode/decode frames to JSON
//! - **[`FrameReader`]** / **[`FrameWriter`]**: Length-prefixed framing over any
//!   tokio byte stream
//! - **[`TcpTransport`]**: Connects and splits a TCP stream into framed halves
//!
//! # Frame Size Limits
//!
//! Frames larger than [`MAX_FRAME_SIZE`] (16 MiB) are rejected on both read and
//! write to prevent memory exhaustion.

pub mod codec;
pub mod framed;
pub mod tcp;

pub use codec::JsonCodec;
pub use framed::{FrameReader, FrameWriter, MAX_FRAME_SIZE};
pub use tcp::{FramedHalves, TcpTransport, DEFAULT_CONNECT_TIMEOUT};

#[cfg(test)]
mod tests;
