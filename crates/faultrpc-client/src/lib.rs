//! FaultRPC Client
//!
//! Drives unary, server-streaming, client-streaming and bidirectional calls
//! against a FaultRPC server. Each call runs on its own connection.

pub mod client;

pub use client::{BidiStreaming, ClientStreaming, FaultClient, ServerStreaming, UnaryReply};
