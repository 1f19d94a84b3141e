// Copyright 2025 FaultRPC Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use faultrpc_common::protocol::{
    CallShape, ClientFrame, FaultRequest, FaultResponse, FaultRpcError, Metadata, Result,
    ServerFrame, ServiceKind, Status,
};
use faultrpc_common::transport::{FrameReader, FrameWriter, TcpTransport};
use std::time::Duration;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};

/// FaultRPC client for driving calls against a fault server
///
/// Opens a fresh TCP connection for every call, so calls never share state
/// and may run concurrently from clones of the same client.
#[derive(Debug, Clone)]
pub struct FaultClient {
    addr: String,
    transport: TcpTransport,
    service: ServiceKind,
}

/// A completed unary call.
#[derive(Debug, Clone, PartialEq)]
pub struct UnaryReply {
    /// Response headers, if the server sent any
    pub headers: Option<Metadata>,
    pub response: FaultResponse,
}

impl FaultClient {
    /// Create a client for the server at `addr`
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            transport: TcpTransport::new(),
            service: ServiceKind::Resiliency,
        }
    }

    /// Route calls to the metadata-exchanging service
    pub fn with_metadata_exchange(mut self) -> Self {
        self.service = ServiceKind::ResiliencyWithMetadata;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.transport = self.transport.with_connect_timeout(timeout);
        self
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    pub fn service(&self) -> ServiceKind {
        self.service
    }

    /// Make a unary call
    ///
    /// A non-OK final status is returned as [`FaultRpcError::Status`].
    pub async fn unary(&self, request: FaultRequest, metadata: Metadata) -> Result<UnaryReply> {
        let mut call = self.open(CallShape::Unary, metadata).await?;
        call.send(request).await?;
        call.close_send().await?;

        let response = call.expect_message().await?;
        call.finish().await?;

        Ok(UnaryReply {
            headers: call.headers,
            response,
        })
    }

    /// Start a server-streaming call
    pub async fn server_stream(
        &self,
        request: FaultRequest,
        metadata: Metadata,
    ) -> Result<ServerStreaming> {
        let mut call = self.open(CallShape::ServerStream, metadata).await?;
        call.send(request).await?;
        call.close_send().await?;
        Ok(ServerStreaming { call })
    }

    /// Start a client-streaming call
    pub async fn client_stream(&self, metadata: Metadata) -> Result<ClientStreaming> {
        let call = self.open(CallShape::ClientStream, metadata).await?;
        Ok(ClientStreaming { call })
    }

    /// Start a bidirectional call
    pub async fn bidi_stream(&self, metadata: Metadata) -> Result<BidiStreaming> {
        let call = self.open(CallShape::BidiStream, metadata).await?;
        Ok(BidiStreaming { call })
    }

    async fn open(&self, shape: CallShape, metadata: Metadata) -> Result<Call> {
        let (reader, mut writer) = self.transport.connect(&self.addr).await?;
        writer
            .write_frame(&ClientFrame::Open {
                service: self.service,
                shape,
                metadata,
            })
            .await?;
        tracing::debug!(addr = %self.addr, %shape, "Call opened");

        Ok(Call {
            reader,
            writer,
            headers: None,
            status: None,
        })
    }
}

/// The client side of one open call.
struct Call {
    reader: FrameReader<OwnedReadHalf>,
    writer: FrameWriter<OwnedWriteHalf>,
    headers: Option<Metadata>,
    status: Option<Status>,
}

impl Call {
    async fn send(&mut self, request: FaultRequest) -> Result<()> {
        self.writer.write_frame(&ClientFrame::Message { request }).await
    }

    async fn close_send(&mut self) -> Result<()> {
        self.writer.write_frame(&ClientFrame::HalfClose).await
    }

    /// Next response, `None` once the call ended with OK.
    async fn message(&mut self) -> Result<Option<FaultResponse>> {
        if let Some(status) = &self.status {
            return Self::outcome(status).map(|()| None);
        }

        loop {
            match self.reader.read_frame::<ServerFrame>().await? {
                Some(ServerFrame::Headers { metadata }) => {
                    self.headers = Some(metadata);
                }
                Some(ServerFrame::Message { response }) => return Ok(Some(response)),
                Some(ServerFrame::Status { status }) => {
                    let outcome = Self::outcome(&status);
                    self.status = Some(status);
                    return outcome.map(|()| None);
                }
                None => {
                    return Err(FaultRpcError::Transport(
                        "connection closed before final status".to_string(),
                    ))
                }
            }
        }
    }

    async fn expect_message(&mut self) -> Result<FaultResponse> {
        self.message()
            .await?
            .ok_or_else(|| FaultRpcError::Protocol("call ended without a response".to_string()))
    }

    /// Reads the final status, rejecting further messages.
    async fn finish(&mut self) -> Result<()> {
        match self.message().await? {
            None => Ok(()),
            Some(_) => Err(FaultRpcError::Protocol(
                "unexpected message after response".to_string(),
            )),
        }
    }

    /// Asks the server to cancel, then drains until the final status.
    async fn cancel(&mut self) -> Result<Status> {
        if let Some(status) = &self.status {
            return Ok(status.clone());
        }

        self.writer.write_frame(&ClientFrame::Cancel).await?;
        loop {
            match self.message().await {
                Ok(Some(_)) => continue,
                Ok(None) | Err(FaultRpcError::Status(_)) => break,
                Err(err) => return Err(err),
            }
        }

        self.status
            .clone()
            .ok_or_else(|| FaultRpcError::Protocol("call ended without a status".to_string()))
    }

    fn outcome(status: &Status) -> Result<()> {
        if status.is_ok() {
            Ok(())
        } else {
            Err(FaultRpcError::Status(status.clone()))
        }
    }
}

/// A server-streaming call in progress.
///
/// Dropping the handle closes the connection; the server cancels the call
/// once it can no longer write to it. Use [`ServerStreaming::cancel`] for
/// a prompt stop.
pub struct ServerStreaming {
    call: Call,
}

impl ServerStreaming {
    /// Receive the next message
    ///
    /// Returns `Ok(None)` once the call has ended with OK and
    /// [`FaultRpcError::Status`] if it ended with a fault.
    pub async fn message(&mut self) -> Result<Option<FaultResponse>> {
        self.call.message().await
    }

    /// Response headers, available once the first message has been received
    pub fn headers(&self) -> Option<&Metadata> {
        self.call.headers.as_ref()
    }

    /// Final status, once the call has ended
    pub fn status(&self) -> Option<&Status> {
        self.call.status.as_ref()
    }

    /// Cancel the call and return the status it ended with
    pub async fn cancel(&mut self) -> Result<Status> {
        self.call.cancel().await
    }
}

/// A client-streaming call in progress.
pub struct ClientStreaming {
    call: Call,
}

impl ClientStreaming {
    /// Send one request
    pub async fn send(&mut self, request: FaultRequest) -> Result<()> {
        self.call.send(request).await
    }

    /// Signal end-of-input and wait for the summary response
    pub async fn close_and_recv(&mut self) -> Result<FaultResponse> {
        self.call.close_send().await?;
        let response = self.call.expect_message().await?;
        self.call.finish().await?;
        Ok(response)
    }

    /// Response headers, available once the summary has been received
    pub fn headers(&self) -> Option<&Metadata> {
        self.call.headers.as_ref()
    }

    /// Cancel the call and return the status it ended with
    pub async fn cancel(&mut self) -> Result<Status> {
        self.call.cancel().await
    }
}

/// A bidirectional call in progress.
pub struct BidiStreaming {
    call: Call,
}

impl BidiStreaming {
    /// Send one request
    pub async fn send(&mut self, request: FaultRequest) -> Result<()> {
        self.call.send(request).await
    }

    /// Signal end-of-input; responses may still arrive
    pub async fn close_send(&mut self) -> Result<()> {
        self.call.close_send().await
    }

    /// Receive the next message, `Ok(None)` once the call ended with OK
    pub async fn message(&mut self) -> Result<Option<FaultResponse>> {
        self.call.message().await
    }

    /// Response headers, available once the first message has been received
    pub fn headers(&self) -> Option<&Metadata> {
        self.call.headers.as_ref()
    }

    pub fn status(&self) -> Option<&Status> {
        self.call.status.as_ref()
    }

    /// Cancel the call and return the status it ended with
    pub async fn cancel(&mut self) -> Result<Status> {
        self.call.cancel().await
    }
}
