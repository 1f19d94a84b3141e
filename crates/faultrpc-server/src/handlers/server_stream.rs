use async_trait::async_trait;
use faultrpc_common::protocol::{FaultRequest, FaultResponse};

use super::{ResiliencyService, ServerStreamFault};
use crate::call::CallContext;
use crate::error::{CallError, CallResult};
use crate::fault::FaultGenerator;

#[async_trait]
impl ServerStreamFault for ResiliencyService {
    /// Emits one message per successful cycle until the client cancels.
    ///
    /// Every cycle reuses the bounds and candidates of the opening request.
    async fn server_stream_fault(&self, ctx: &CallContext, request: FaultRequest) -> CallResult<()> {
        let mut generator = FaultGenerator::from_entropy();
        let mut sent: u64 = 0;

        loop {
            if ctx.is_cancelled() {
                tracing::debug!(sent, "Server stream cancelled");
                return Err(CallError::Cancelled);
            }

            self.fault_cycle(ctx, &mut generator, &request).await?;
            ctx.send(FaultResponse::generated()).await?;
            sent += 1;
        }
    }
}
