use async_trait::async_trait;
use faultrpc_common::protocol::FaultResponse;

use super::{BidiStreamFault, ResiliencyService};
use crate::call::{CallContext, Inbound};
use crate::error::{CallError, CallResult};
use crate::fault::FaultGenerator;

#[async_trait]
impl BidiStreamFault for ResiliencyService {
    /// Answers each inbound request with one response.
    ///
    /// Ends with success on end-of-input and on cancellation. Read errors
    /// fail only this call.
    async fn bidi_stream_fault(&self, ctx: &CallContext, inbound: &mut Inbound) -> CallResult<()> {
        let mut generator = FaultGenerator::from_entropy();

        loop {
            if ctx.is_cancelled() {
                return Ok(());
            }

            let request = match ctx.recv(inbound).await {
                Ok(Some(request)) => request,
                Ok(None) | Err(CallError::Cancelled) => return Ok(()),
                Err(err) => return Err(err),
            };

            match self.fault_cycle(ctx, &mut generator, &request).await {
                Ok(()) => {}
                Err(CallError::Cancelled) => return Ok(()),
                Err(err) => return Err(err),
            }

            match ctx.send(FaultResponse::generated()).await {
                Ok(()) => {}
                Err(CallError::Cancelled) => return Ok(()),
                Err(err) => return Err(err),
            }
        }
    }
}
