//! Fault code translation.
//!
//! Clients pick outcomes by number. Codes `0..=16` follow the canonical RPC
//! status numbering; anything else is reported as `INTERNAL`.

use faultrpc_common::protocol::{Status, StatusCode, GENERATED_BY_SERVER};

/// Looks up a code in the fixed table.
pub fn lookup(code: u32) -> Option<StatusCode> {
    usize::try_from(code)
        .ok()
        .and_then(|index| StatusCode::ALL.get(index))
        .copied()
}

/// Maps a numeric fault code to the outcome a call terminates with.
///
/// Total: unknown codes yield [`StatusCode::Internal`] and are logged.
///
/// # Example
///
/// ```
/// use faultrpc_server::fault::translate;
/// use faultrpc_common::protocol::StatusCode;
///
/// assert_eq!(translate(0), StatusCode::Ok);
/// assert_eq!(translate(5), StatusCode::NotFound);
/// assert_eq!(translate(999), StatusCode::Internal);
/// ```
pub fn translate(code: u32) -> StatusCode {
    match lookup(code) {
        Some(status) => status,
        None => {
            tracing::warn!(code, "Unknown fault code, reporting INTERNAL");
            StatusCode::Internal
        }
    }
}

/// The status a call must terminate with for `code`, or `None` if the call
/// should continue.
pub fn fault_status(code: u32) -> Option<Status> {
    match translate(code) {
        StatusCode::Ok => None,
        status_code => Some(Status::new(status_code, GENERATED_BY_SERVER)),
    }
}
