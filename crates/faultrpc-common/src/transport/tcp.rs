use std::time::Duration;

use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

use crate::protocol::error::{FaultRpcError, Result};
use crate::transport::framed::{FrameReader, FrameWriter};

/// Default timeout for establishing a connection (5 seconds)
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Framed halves of one TCP connection.
pub type FramedHalves = (FrameReader<OwnedReadHalf>, FrameWriter<OwnedWriteHalf>);

/// TCP transport for FaultRPC.
///
/// Each call uses its own connection; the stream is split so that reading
/// and writing can proceed from different tasks.
///
/// # Example
///
/// ```no_run
/// use faultrpc_common::transport::TcpTransport;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let transport = TcpTransport::new();
/// let (reader, writer) = transport.connect("127.0.0.1:9090").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TcpTransport {
    connect_timeout: Duration,
}

impl TcpTransport {
    pub fn new() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Connects to a remote endpoint.
    ///
    /// The address may resolve to several socket addresses; each is tried in
    /// turn until one accepts.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The address cannot be resolved
    /// - Every resolved address refuses or times out
    pub async fn connect(&self, addr: &str) -> Result<FramedHalves> {
        let socket_addrs = tokio::net::lookup_host(addr)
            .await
            .map_err(|e| FaultRpcError::Connection(format!("Invalid address '{}': {}", addr, e)))?;

        let mut last_err = None;
        for socket_addr in socket_addrs {
            match tokio::time::timeout(self.connect_timeout, TcpStream::connect(socket_addr)).await {
                Ok(Ok(stream)) => {
                    stream
                        .set_nodelay(true)
                        .map_err(|e| FaultRpcError::Connection(format!("Failed to set nodelay: {}", e)))?;
                    return Ok(Self::split(stream));
                }
                Ok(Err(e)) => last_err = Some(e.to_string()),
                Err(_) => {
                    last_err = Some(format!(
                        "timed out after {}ms",
                        self.connect_timeout.as_millis()
                    ))
                }
            }
        }

        Err(FaultRpcError::Connection(format!(
            "Failed to connect to {}: {}",
            addr,
            last_err.unwrap_or_else(|| "no addresses resolved".to_string())
        )))
    }

    /// Splits an established stream into framed read and write halves.
    pub fn split(stream: TcpStream) -> FramedHalves {
        let (read_half, write_half) = stream.into_split();
        (FrameReader::new(read_half), FrameWriter::new(write_half))
    }
}

impl Default for TcpTransport {
    fn default() -> Self {
        Self::new()
    }
}
