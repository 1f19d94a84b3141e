use async_trait::async_trait;
use faultrpc_common::protocol::FaultResponse;

use super::{ClientStreamFault, ResiliencyService};
use crate::call::{CallContext, Inbound};
use crate::error::CallResult;
use crate::fault::FaultGenerator;

#[async_trait]
impl ClientStreamFault for ResiliencyService {
    /// Runs one cycle per inbound request and summarizes at end-of-input.
    async fn client_stream_fault(
        &self,
        ctx: &CallContext,
        inbound: &mut Inbound,
    ) -> CallResult<FaultResponse> {
        let mut generator = FaultGenerator::from_entropy();
        let mut received: u64 = 0;

        while let Some(request) = ctx.recv(inbound).await? {
            self.fault_cycle(ctx, &mut generator, &request).await?;
            received += 1;
        }

        tracing::debug!(received, "Client stream complete");
        Ok(FaultResponse::received(received))
    }
}
