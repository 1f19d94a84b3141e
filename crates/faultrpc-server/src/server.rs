//! TCP Server for FaultRPC
//!
//! Accepts one call per connection. Each connection gets its own task, and
//! within that task a reader and a writer task around the handler:
//!
//! - The reader turns client frames into the call's inbound queue, and
//!   cancels the call on a `cancel` frame or a connection that ends before
//!   `half_close`
//! - The writer drains the call's outbound channel onto the socket
//! - The handler runs the requested call shape and its outcome becomes the
//!   final `status` frame
//!
//! A failing connection only ever fails its own call.
//!
//! # Example
//!
//! ```no_run
//! use faultrpc_server::{FaultServer, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let server = FaultServer::bind("127.0.0.1:9090", ServerConfig::default())
//!         .await
//!         .unwrap();
//!     server.run().await.unwrap();
//! }
//! ```

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use faultrpc_common::protocol::{
    CallShape, ClientFrame, FaultRequest, FaultResponse, FaultRpcError, Result, ServerFrame,
    ServiceKind, Status,
};
use faultrpc_common::transport::{FrameReader, FrameWriter, TcpTransport};
use tokio::io::AsyncRead;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::call::{CallContext, Inbound, InboundSender, Outbound};
use crate::config::ServerConfig;
use crate::error::{CallError, CallResult};
use crate::handlers::{FaultService, ResiliencyService};
use crate::metadata::WithMetadata;

/// Pause after a failed accept before trying again.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Services shared by every connection.
#[derive(Debug)]
struct Services {
    plain: ResiliencyService,
    decorated: WithMetadata<ResiliencyService>,
    channel_capacity: usize,
}

/// The fault-injection server.
pub struct FaultServer {
    listener: TcpListener,
    services: Arc<Services>,
}

impl FaultServer {
    /// Validates `config` and binds a listener on `addr`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the address
    /// cannot be bound.
    pub async fn bind(addr: &str, config: ServerConfig) -> Result<Self> {
        config.validate().map_err(FaultRpcError::Config)?;

        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| FaultRpcError::Transport(format!("Failed to bind to {}: {}", addr, e)))?;

        let plain = ResiliencyService::new(&config);
        let services = Services {
            decorated: WithMetadata::new(plain.clone(), config.location.clone()),
            plain,
            channel_capacity: config.channel_capacity,
        };

        Ok(Self {
            listener,
            services: Arc::new(services),
        })
    }

    /// The address the server is listening on.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener
            .local_addr()
            .map_err(|e| FaultRpcError::Transport(format!("Failed to get local address: {}", e)))
    }

    /// Serves calls forever.
    pub async fn run(self) -> Result<()> {
        self.run_with_shutdown(std::future::pending()).await
    }

    /// Serves calls until `shutdown` resolves.
    ///
    /// Calls already in flight keep running on their own tasks.
    pub async fn run_with_shutdown<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tracing::info!("FaultRPC server listening on {}", self.local_addr()?);
        tokio::pin!(shutdown);

        loop {
            let accepted = tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Shutting down");
                    return Ok(());
                }
                accepted = self.listener.accept() => accepted,
            };

            let (stream, peer) = match accepted {
                Ok(conn) => conn,
                Err(e) => {
                    tracing::error!("Failed to accept connection: {}", e);
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                    continue;
                }
            };

            if let Err(e) = stream.set_nodelay(true) {
                tracing::debug!(%peer, "Failed to set nodelay: {}", e);
            }

            let services = self.services.clone();
            tokio::spawn(async move {
                if let Err(err) = handle_connection(stream, services).await {
                    tracing::error!(%peer, "Error serving connection: {}", err);
                }
            });
        }
    }
}

/// Runs the single call carried by one connection.
async fn handle_connection(stream: TcpStream, services: Arc<Services>) -> Result<()> {
    let (mut reader, mut writer) = TcpTransport::split(stream);

    let (service, shape, metadata) = match reader.read_frame::<ClientFrame>().await? {
        Some(ClientFrame::Open {
            service,
            shape,
            metadata,
        }) => (service, shape, metadata),
        Some(_) => {
            let status = Status::invalid_argument("first frame must be open");
            writer.write_frame(&ServerFrame::Status { status }).await?;
            return writer.shutdown().await;
        }
        None => return Ok(()),
    };

    tracing::info!(%shape, ?service, "Call started");

    let token = CancellationToken::new();
    let (outbound, outbound_rx) = Outbound::channel(services.channel_capacity);
    let (inbound_tx, inbound) = Inbound::channel();

    let single_request = matches!(shape, CallShape::Unary | CallShape::ServerStream);
    let reader_task = tokio::spawn(read_loop(reader, inbound_tx, single_request, token.clone()));
    let writer_task = tokio::spawn(write_loop(writer, outbound_rx, token.clone()));

    let ctx = CallContext::new(token, metadata, outbound.clone());
    let outcome = match service {
        ServiceKind::Resiliency => dispatch(&services.plain, &ctx, shape, inbound).await,
        ServiceKind::ResiliencyWithMetadata => {
            dispatch(&services.decorated, &ctx, shape, inbound).await
        }
    };

    let outcome = match outcome {
        Ok(Some(response)) => ctx.send(response).await,
        Ok(None) => Ok(()),
        Err(err) => Err(err),
    };
    drop(ctx);

    let status = match outcome {
        Ok(()) => {
            tracing::info!(%shape, "Call completed");
            Status::ok()
        }
        Err(err) => {
            let status = err.status();
            match &err {
                CallError::Status(_) => tracing::info!(%shape, %status, "Call terminated"),
                CallError::Cancelled => tracing::info!(%shape, "Call cancelled by client"),
                CallError::Transport(e) => tracing::error!(%shape, "Call failed: {}", e),
            }
            status
        }
    };

    if let Err(e) = outbound.send_frame(ServerFrame::Status { status }).await {
        tracing::debug!("Final status not delivered: {}", e);
    }
    drop(outbound);

    let written = writer_task.await;
    reader_task.abort();
    written.map_err(|e| FaultRpcError::Transport(format!("Writer task failed: {}", e)))
}

/// Runs `shape` on `service`; unary and client-stream calls yield the
/// response still to be sent.
async fn dispatch<S: FaultService>(
    service: &S,
    ctx: &CallContext,
    shape: CallShape,
    mut inbound: Inbound,
) -> CallResult<Option<FaultResponse>> {
    match shape {
        CallShape::Unary => {
            let request = single_request(ctx, &mut inbound).await?;
            service.unary_fault(ctx, request).await.map(Some)
        }
        CallShape::ServerStream => {
            let request = single_request(ctx, &mut inbound).await?;
            service.server_stream_fault(ctx, request).await.map(|()| None)
        }
        CallShape::ClientStream => service.client_stream_fault(ctx, &mut inbound).await.map(Some),
        CallShape::BidiStream => service.bidi_stream_fault(ctx, &mut inbound).await.map(|()| None),
    }
}

async fn single_request(ctx: &CallContext, inbound: &mut Inbound) -> CallResult<FaultRequest> {
    ctx.recv(inbound)
        .await?
        .ok_or_else(|| CallError::Status(Status::invalid_argument("missing request")))
}

/// Feeds client frames into the call until the client stops sending.
///
/// Unary and server-stream calls take exactly one request; the queue is
/// closed as soon as it has been delivered. A connection that ends before
/// `half_close` cancels the call, one that ends after it does not.
async fn read_loop<R: AsyncRead + Unpin>(
    mut reader: FrameReader<R>,
    inbound_tx: InboundSender,
    single_request: bool,
    token: CancellationToken,
) {
    let mut inbound_tx = Some(inbound_tx);
    let mut half_closed = false;

    loop {
        match reader.read_frame::<ClientFrame>().await {
            Ok(Some(ClientFrame::Message { request })) => match inbound_tx.take() {
                Some(tx) => {
                    // A closed queue means the handler no longer reads.
                    let _ = tx.send(Ok(request));
                    if !single_request {
                        inbound_tx = Some(tx);
                    }
                }
                None if half_closed => tracing::warn!("Message after half-close ignored"),
                None => tracing::warn!("Extra request on single-request call ignored"),
            },
            Ok(Some(ClientFrame::HalfClose)) => {
                half_closed = true;
                inbound_tx = None;
            }
            Ok(Some(ClientFrame::Cancel)) => {
                token.cancel();
                return;
            }
            Ok(Some(ClientFrame::Open { .. })) => {
                if let Some(tx) = &inbound_tx {
                    let _ = tx.send(Err(FaultRpcError::Protocol("duplicate open frame".into())));
                }
            }
            Ok(None) => {
                if !half_closed {
                    token.cancel();
                }
                return;
            }
            Err(err) => {
                match inbound_tx.take() {
                    Some(tx) => {
                        let _ = tx.send(Err(err));
                    }
                    None => {
                        tracing::debug!("Read failed after last request: {}", err);
                        token.cancel();
                    }
                }
                return;
            }
        }
    }
}

/// Writes outbound frames until every sender is gone.
async fn write_loop(
    mut writer: FrameWriter<OwnedWriteHalf>,
    mut outbound_rx: mpsc::Receiver<ServerFrame>,
    token: CancellationToken,
) {
    while let Some(frame) = outbound_rx.recv().await {
        if let Err(err) = writer.write_frame(&frame).await {
            tracing::error!("Failed to write frame: {}", err);
            token.cancel();
            return;
        }
    }

    if let Err(err) = writer.shutdown().await {
        tracing::debug!("Failed to shut down connection: {}", err);
    }
}
