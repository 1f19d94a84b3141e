use async_trait::async_trait;
use faultrpc_common::protocol::{FaultRequest, FaultResponse};

use super::{ResiliencyService, UnaryFault};
use crate::call::CallContext;
use crate::error::CallResult;
use crate::fault::FaultGenerator;

#[async_trait]
impl UnaryFault for ResiliencyService {
    async fn unary_fault(
        &self,
        ctx: &CallContext,
        request: FaultRequest,
    ) -> CallResult<FaultResponse> {
        let mut generator = FaultGenerator::from_entropy();
        self.fault_cycle(ctx, &mut generator, &request).await?;
        Ok(FaultResponse::generated())
    }
}
