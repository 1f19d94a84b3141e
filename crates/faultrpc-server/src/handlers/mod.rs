//! Call-shape handlers.
//!
//! Each call shape is its own capability trait. [`ResiliencyService`]
//! implements all four by running fault cycles; the metadata decorator in
//! [`crate::metadata`] wraps any implementation of them.
//!
//! # Termination
//!
//! A handler returns:
//! - `Ok(..)` when the call ends successfully
//! - `Err(CallError::Status(..))` for an injected fault or rejected parameters
//! - `Err(CallError::Cancelled)` when the client cancelled
//! - `Err(CallError::Transport(..))` when the call's stream failed

mod bidi;
mod client_stream;
mod server_stream;
mod unary;


use std::time::Duration;

use async_trait::async_trait;
use faultrpc_common::protocol::{FaultRequest, FaultResponse};

use crate::call::{CallContext, Inbound};
use crate::config::ServerConfig;
use crate::error::{CallError, CallResult, FaultError};
use crate::fault::{fault_status, FaultGenerator};

/// One request, one response.
#[async_trait]
pub trait UnaryFault: Send + Sync {
    async fn unary_fault(&self, ctx: &CallContext, request: FaultRequest)
        -> CallResult<FaultResponse>;
}

/// One request, a stream of responses until the client cancels.
#[async_trait]
pub trait ServerStreamFault: Send + Sync {
    async fn server_stream_fault(&self, ctx: &CallContext, request: FaultRequest)
        -> CallResult<()>;
}

/// A stream of requests, one summary response at end-of-input.
#[async_trait]
pub trait ClientStreamFault: Send + Sync {
    async fn client_stream_fault(
        &self,
        ctx: &CallContext,
        inbound: &mut Inbound,
    ) -> CallResult<FaultResponse>;
}

/// One response per request, until end-of-input or cancellation.
#[async_trait]
pub trait BidiStreamFault: Send + Sync {
    async fn bidi_stream_fault(&self, ctx: &CallContext, inbound: &mut Inbound) -> CallResult<()>;
}

/// A service able to serve every call shape.
pub trait FaultService:
    UnaryFault + ServerStreamFault + ClientStreamFault + BidiStreamFault
{
}

impl<T> FaultService for T where
    T: UnaryFault + ServerStreamFault + ClientStreamFault + BidiStreamFault
{
}

/// The fault-injecting service.
///
/// Stateless apart from its limits; every call gets its own
/// [`FaultGenerator`].
#[derive(Debug, Clone)]
pub struct ResiliencyService {
    max_delay: Duration,
}

impl ResiliencyService {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            max_delay: config.max_delay,
        }
    }

    /// Largest delay a request may ask for.
    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// Runs one fault cycle: draw, honor the delay, translate.
    ///
    /// Returns `Ok(())` when the drawn outcome is success. Any other
    /// outcome becomes `CallError::Status`.
    pub(crate) async fn fault_cycle(
        &self,
        ctx: &CallContext,
        generator: &mut FaultGenerator,
        request: &FaultRequest,
    ) -> CallResult<()> {
        let requested = request.max_delay();
        if requested > self.max_delay {
            return Err(FaultError::DelayTooLong {
                requested,
                limit: self.max_delay,
            }
            .into());
        }

        let fault = generator.generate_for(request)?;
        tracing::debug!(delay = ?fault.delay, code = fault.code, "Fault drawn");

        ctx.sleep(fault.delay).await?;

        match fault_status(fault.code) {
            None => Ok(()),
            Some(status) => Err(CallError::Status(status)),
        }
    }
}

impl Default for ResiliencyService {
    fn default() -> Self {
        Self::new(&ServerConfig::default())
    }
}
