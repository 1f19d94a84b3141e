use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::protocol::error::Result;

/// JSON codec for FaultRPC frames
///
/// Frames are plain serde types, so one pair of generic functions covers
/// both directions of the protocol.
///
/// # Example
///
/// ```
/// use faultrpc_common::transport::JsonCodec;
/// use faultrpc_common::protocol::{ClientFrame, FaultRequest};
///
/// let frame = ClientFrame::Message { request: FaultRequest::new(vec![0]) };
/// let encoded = JsonCodec::encode(&frame).unwrap();
/// let decoded: ClientFrame = JsonCodec::decode(&encoded).unwrap();
/// assert_eq!(frame, decoded);
/// ```
pub struct JsonCodec;

impl JsonCodec {
    /// Encode a frame to bytes
    pub fn encode<T: Serialize>(frame: &T) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(frame)?)
    }

    /// Decode a frame from bytes
    pub fn decode<T: DeserializeOwned>(data: &[u8]) -> Result<T> {
        Ok(serde_json::from_slice(data)?)
    }
}
