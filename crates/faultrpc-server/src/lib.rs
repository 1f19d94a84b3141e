//! FaultRPC Server
//!
//! This crate provides the fault-injecting resiliency service and the TCP
//! server that exposes it.
//!
//! # Components
//!
//! - [`fault`] - Fault generation and outcome translation
//! - [`handlers`] - One capability trait per call shape and the
//!   [`ResiliencyService`] implementing them
//! - [`metadata`] - The [`WithMetadata`] decorator exchanging correlation
//!   metadata
//! - [`server`] - The [`FaultServer`] accept loop
//!
//! # Example
//!
//! ```no_run
//! use faultrpc_server::{FaultServer, ServerConfig};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig::new()
//!         .with_location("eu-west-1")
//!         .with_max_delay(Duration::from_secs(10));
//!
//!     let server = FaultServer::bind("0.0.0.0:9090", config).await.unwrap();
//!     server.run().await.unwrap();
//! }
//! ```

pub mod call;
pub mod config;
pub mod error;
pub mod fault;
pub mod handlers;
pub mod metadata;
pub mod server;

pub use call::{CallContext, Inbound, Outbound};
pub use config::ServerConfig;
pub use error::{CallError, CallResult, FaultError};
pub use fault::{translate, FaultGenerator, FaultResult};
pub use handlers::{
    BidiStreamFault, ClientStreamFault, FaultService, ResiliencyService, ServerStreamFault,
    UnaryFault,
};
pub use metadata::WithMetadata;
pub use server::FaultServer;
