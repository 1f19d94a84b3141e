//! Per-call session state.
//!
//! A call owns one [`CancellationToken`], one inbound queue of client
//! requests and one outbound channel. Headers, messages and the final status
//! all travel through the same outbound channel so their order on the wire
//! matches the order they were produced in.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use faultrpc_common::protocol::{
    FaultRequest, FaultResponse, FaultRpcError, Metadata, Result, ServerFrame,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::{CallError, CallResult};

/// Producer side of an [`Inbound`] queue, held by the connection reader.
pub type InboundSender = mpsc::UnboundedSender<Result<FaultRequest>>;

/// Client requests arriving on a streaming call.
///
/// The queue ends (`recv` yields `Ok(None)`) once the client half-closes.
#[derive(Debug)]
pub struct Inbound {
    rx: mpsc::UnboundedReceiver<Result<FaultRequest>>,
}

impl Inbound {
    /// Creates a connected sender and inbound queue.
    pub fn channel() -> (InboundSender, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self { rx })
    }

    /// Receives the next request, `None` on end-of-input.
    pub async fn recv(&mut self) -> Result<Option<FaultRequest>> {
        match self.rx.recv().await {
            Some(Ok(request)) => Ok(Some(request)),
            Some(Err(err)) => Err(err),
            None => Ok(None),
        }
    }
}

/// Frames headed for the client, drained by the connection writer.
#[derive(Debug, Clone)]
pub struct Outbound {
    tx: mpsc::Sender<ServerFrame>,
}

impl Outbound {
    /// Creates an outbound channel buffering up to `capacity` frames.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<ServerFrame>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    /// Queues a frame, waiting for buffer space.
    pub async fn send_frame(&self, frame: ServerFrame) -> Result<()> {
        self.tx
            .send(frame)
            .await
            .map_err(|_| FaultRpcError::Connection("call stream closed".to_string()))
    }
}

/// Context handed to every handler for the lifetime of one call.
#[derive(Debug)]
pub struct CallContext {
    token: CancellationToken,
    metadata: Metadata,
    outbound: Outbound,
    headers_sent: AtomicBool,
}

impl CallContext {
    /// Creates a context for one call.
    pub fn new(token: CancellationToken, metadata: Metadata, outbound: Outbound) -> Self {
        Self {
            token,
            metadata,
            outbound,
            headers_sent: AtomicBool::new(false),
        }
    }

    /// The call's cancellation token.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Metadata the client attached when opening the call.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Sends response headers. Only the first call has any effect.
    pub async fn send_headers(&self, metadata: Metadata) -> CallResult<()> {
        if self.headers_sent.swap(true, Ordering::AcqRel) {
            tracing::warn!("Headers already sent for this call, ignoring");
            return Ok(());
        }
        self.send_frame(ServerFrame::Headers { metadata }).await
    }

    /// Sends one response message to the client.
    pub async fn send(&self, response: FaultResponse) -> CallResult<()> {
        self.send_frame(ServerFrame::Message { response }).await
    }

    /// Receives the next inbound request, racing cancellation.
    pub async fn recv(&self, inbound: &mut Inbound) -> CallResult<Option<FaultRequest>> {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(CallError::Cancelled),
            next = inbound.recv() => next.map_err(CallError::from),
        }
    }

    /// Waits for `delay` unless the call is cancelled first.
    pub async fn sleep(&self, delay: Duration) -> CallResult<()> {
        if delay.is_zero() {
            return if self.is_cancelled() {
                Err(CallError::Cancelled)
            } else {
                Ok(())
            };
        }
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(CallError::Cancelled),
            _ = tokio::time::sleep(delay) => Ok(()),
        }
    }

    async fn send_frame(&self, frame: ServerFrame) -> CallResult<()> {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(CallError::Cancelled),
            sent = self.outbound.send_frame(frame) => sent.map_err(CallError::from),
        }
    }
}
