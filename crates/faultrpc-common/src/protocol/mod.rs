pub mod error;
pub mod frames;
pub mod metadata;
pub mod requests;
pub mod responses;
pub mod status;

#[cfg(test)]
mod tests;

pub use error::{FaultRpcError, Result};
pub use frames::{CallShape, ClientFrame, ServerFrame, ServiceKind};
pub use metadata::Metadata;
pub use requests::FaultRequest;
pub use responses::{FaultResponse, GENERATED_BY_SERVER};
pub use status::{Status, StatusCode};
