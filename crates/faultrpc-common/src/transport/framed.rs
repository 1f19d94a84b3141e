use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::protocol::error::{FaultRpcError, Result};
use crate::transport::codec::JsonCodec;

/// Maximum frame size (16 MiB)
pub const MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

/// Reads length-prefixed JSON frames from an async byte stream.
///
/// # Wire Protocol
///
/// ```text
/// [4-byte length as u32 big-endian] [JSON data]
/// ```
pub struct FrameReader<R> {
    inner: R,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Reads the next frame.
    ///
    /// Returns `Ok(None)` when the peer closed the stream on a frame
    /// boundary.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The stream fails or ends in the middle of a frame
    /// - The length prefix exceeds [`MAX_FRAME_SIZE`]
    /// - The payload is not a valid frame
    pub async fn read_frame<T: DeserializeOwned>(&mut self) -> Result<Option<T>> {
        let mut len_buf = [0u8; 4];
        let mut filled = 0;
        while filled < len_buf.len() {
            let n = self
                .inner
                .read(&mut len_buf[filled..])
                .await
                .map_err(|e| FaultRpcError::Transport(format!("Failed to read length: {}", e)))?;
            if n == 0 {
                if filled == 0 {
                    return Ok(None);
                }
                return Err(FaultRpcError::Transport(format!(
                    "Stream ended after {} of 4 length bytes",
                    filled
                )));
            }
            filled += n;
        }

        let len = u32::from_be_bytes(len_buf) as usize;
        if len > MAX_FRAME_SIZE {
            return Err(FaultRpcError::FrameTooLarge {
                size: len,
                max: MAX_FRAME_SIZE,
            });
        }

        let mut buf = vec![0u8; len];
        self.inner
            .read_exact(&mut buf)
            .await
            .map_err(|e| FaultRpcError::Transport(format!("Failed to read data: {}", e)))?;

        JsonCodec::decode(&buf).map(Some)
    }
}

/// Writes length-prefixed JSON frames to an async byte stream.
pub struct FrameWriter<W> {
    inner: W,
}

impl<W: AsyncWrite + Unpin> FrameWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Encodes and writes one frame, flushing afterwards.
    pub async fn write_frame<T: Serialize>(&mut self, frame: &T) -> Result<()> {
        let encoded = JsonCodec::encode(frame)?;
        if encoded.len() > MAX_FRAME_SIZE {
            return Err(FaultRpcError::FrameTooLarge {
                size: encoded.len(),
                max: MAX_FRAME_SIZE,
            });
        }

        let len = encoded.len() as u32;
        self.inner
            .write_all(&len.to_be_bytes())
            .await
            .map_err(|e| FaultRpcError::Transport(format!("Failed to send frame length: {}", e)))?;
        self.inner
            .write_all(&encoded)
            .await
            .map_err(|e| FaultRpcError::Transport(format!("Failed to send frame data: {}", e)))?;
        self.inner
            .flush()
            .await
            .map_err(|e| FaultRpcError::Transport(format!("Failed to flush stream: {}", e)))?;

        Ok(())
    }

    /// Shuts down the write half, signalling end of stream to the peer.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.inner
            .shutdown()
            .await
            .map_err(|e| FaultRpcError::Transport(format!("Failed to shut down stream: {}", e)))
    }
}
