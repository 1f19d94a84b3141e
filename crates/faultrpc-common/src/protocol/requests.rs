use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Parameters for one fault cycle.
///
/// A client sends the delay bounds (in milliseconds) and the set of numeric
/// status codes the server should pick from. For server-streamed calls the
/// same request drives every emitted message.
///
/// # Example
///
/// ```
/// use faultrpc_common::protocol::FaultRequest;
/// use std::time::Duration;
///
/// let request = FaultRequest::new(vec![0, 5])
///     .with_delay_ms(100, 250);
/// assert_eq!(request.min_delay(), Duration::from_millis(100));
/// assert_eq!(request.max_delay(), Duration::from_millis(250));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FaultRequest {
    /// Lower bound of the injected delay, inclusive
    pub min_delay_ms: u64,
    /// Upper bound of the injected delay, inclusive
    pub max_delay_ms: u64,
    /// Candidate outcome codes, drawn uniformly
    pub status_codes: Vec<u32>,
}

impl FaultRequest {
    /// Creates a request with no delay and the given candidate codes.
    pub fn new(status_codes: Vec<u32>) -> Self {
        Self {
            min_delay_ms: 0,
            max_delay_ms: 0,
            status_codes,
        }
    }

    pub fn with_delay_ms(mut self, min_delay_ms: u64, max_delay_ms: u64) -> Self {
        self.min_delay_ms = min_delay_ms;
        self.max_delay_ms = max_delay_ms;
        self
    }

    pub fn min_delay(&self) -> Duration {
        Duration::from_millis(self.min_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }
}
