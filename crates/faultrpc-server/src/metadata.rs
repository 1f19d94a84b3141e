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

//! Metadata exchange decorator.
//!
//! [`WithMetadata`] wraps any fault service. It logs the metadata a client
//! attached to the call and sends correlation metadata back once per call:
//!
//! - unary: before the successful response
//! - server stream and bidirectional: before the first message
//! - client stream: before the final summary
//!
//! Inbound metadata never affects the outcome of a call, and a failure to
//! send headers is logged without failing the call.

use async_trait::async_trait;
use faultrpc_common::protocol::metadata::{RESPONSE_ID, SERVER_LOCATION, SERVER_TIME};
use faultrpc_common::protocol::{FaultRequest, FaultResponse, Metadata};

use crate::call::{CallContext, Inbound};
use crate::error::{CallError, CallResult};
use crate::handlers::{BidiStreamFault, ClientStreamFault, ServerStreamFault, UnaryFault};

/// Builds the correlation metadata for one response.
///
/// Every invocation carries a fresh `response-id`.
pub fn correlation_metadata(location: &str) -> Metadata {
    let mut metadata = Metadata::new();
    metadata.insert(
        SERVER_TIME.to_string(),
        chrono::Local::now().format("%H:%M:%S").to_string(),
    );
    metadata.insert(SERVER_LOCATION.to_string(), location.to_string());
    metadata.insert(RESPONSE_ID.to_string(), uuid::Uuid::new_v4().to_string());
    metadata
}

/// Decorates a service with metadata exchange.
#[derive(Debug, Clone)]
pub struct WithMetadata<S> {
    inner: S,
    location: String,
}

impl<S> WithMetadata<S> {
    pub fn new(inner: S, location: impl Into<String>) -> Self {
        Self {
            inner,
            location: location.into(),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    fn log_inbound(&self, ctx: &CallContext) {
        let metadata = ctx.metadata();
        if metadata.is_empty() {
            tracing::info!("request metadata not found");
            return;
        }
        for (key, value) in metadata {
            tracing::info!(%key, %value, "request metadata");
        }
    }

    async fn send_headers(&self, ctx: &CallContext) {
        match ctx.send_headers(correlation_metadata(&self.location)).await {
            Ok(()) => {}
            Err(CallError::Cancelled) => {
                tracing::debug!("Call cancelled before response metadata was sent");
            }
            Err(err) => tracing::warn!(error = %err, "Failed to send response metadata"),
        }
    }
}

#[async_trait]
impl<S: UnaryFault> UnaryFault for WithMetadata<S> {
    async fn unary_fault(
        &self,
        ctx: &CallContext,
        request: FaultRequest,
    ) -> CallResult<FaultResponse> {
        self.log_inbound(ctx);
        let response = self.inner.unary_fault(ctx, request).await?;
        self.send_headers(ctx).await;
        Ok(response)
    }
}

#[async_trait]
impl<S: ServerStreamFault> ServerStreamFault for WithMetadata<S> {
    async fn server_stream_fault(&self, ctx: &CallContext, request: FaultRequest) -> CallResult<()> {
        self.log_inbound(ctx);
        self.send_headers(ctx).await;
        self.inner.server_stream_fault(ctx, request).await
    }
}

#[async_trait]
impl<S: ClientStreamFault> ClientStreamFault for WithMetadata<S> {
    async fn client_stream_fault(
        &self,
        ctx: &CallContext,
        inbound: &mut Inbound,
    ) -> CallResult<FaultResponse> {
        self.log_inbound(ctx);
        let response = self.inner.client_stream_fault(ctx, inbound).await?;
        self.send_headers(ctx).await;
        Ok(response)
    }
}

#[async_trait]
impl<S: BidiStreamFault> BidiStreamFault for WithMetadata<S> {
    async fn bidi_stream_fault(&self, ctx: &CallContext, inbound: &mut Inbound) -> CallResult<()> {
        self.log_inbound(ctx);
        self.send_headers(ctx).await;
        self.inner.bidi_stream_fault(ctx, inbound).await
    }
}
