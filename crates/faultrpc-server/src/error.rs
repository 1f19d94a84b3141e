use std::time::Duration;

use faultrpc_common::protocol::{FaultRpcError, Status};
use thiserror::Error;

/// Invalid fault parameters supplied by a client.
///
/// These are configuration errors, not injected faults: the call is rejected
/// with `INVALID_ARGUMENT` before any delay is honored.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FaultError {
    #[error("status code candidates must not be empty")]
    EmptyCandidates,

    #[error("max delay {max:?} is less than min delay {min:?}")]
    InvertedBounds { min: Duration, max: Duration },

    #[error("max delay {requested:?} exceeds the server limit of {limit:?}")]
    DelayTooLong { requested: Duration, limit: Duration },
}

impl From<FaultError> for Status {
    fn from(err: FaultError) -> Self {
        Status::invalid_argument(err.to_string())
    }
}

/// Why a handler stopped before completing normally.
#[derive(Error, Debug)]
pub enum CallError {
    /// Injected fault or rejected parameters
    #[error("{0}")]
    Status(Status),

    /// The client cancelled the call
    #[error("call cancelled by client")]
    Cancelled,

    /// Reading or writing the call's stream failed
    #[error("transport error: {0}")]
    Transport(#[from] FaultRpcError),
}

impl CallError {
    /// The status reported to the client for this termination.
    pub fn status(&self) -> Status {
        match self {
            CallError::Status(status) => status.clone(),
            CallError::Cancelled => Status::cancelled("Client cancelled request"),
            CallError::Transport(err) => Status::unavailable(err.to_string()),
        }
    }
}

impl From<FaultError> for CallError {
    fn from(err: FaultError) -> Self {
        CallError::Status(err.into())
    }
}

pub type CallResult<T> = std::result::Result<T, CallError>;
