//! Tests for the transport layer
//!
//! These tests run the framing over in-memory duplex pipes.

#[cfg(test)]
mod tests {
    use crate::protocol::{
        CallShape, ClientFrame, FaultRequest, FaultResponse, FaultRpcError, ServerFrame,
        ServiceKind, Status,
    };
    use crate::transport::{FrameReader, FrameWriter, MAX_FRAME_SIZE};
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn test_frames_arrive_in_order() {
        let (client, server) = tokio::io::duplex(4096);
        let mut writer = FrameWriter::new(client);
        let mut reader = FrameReader::new(server);

        let frames = vec![
            ClientFrame::Open {
                service: ServiceKind::Resiliency,
                shape: CallShape::ClientStream,
                metadata: Default::default(),
            },
            ClientFrame::Message { request: FaultRequest::new(vec![0]) },
            ClientFrame::Message { request: FaultRequest::new(vec![5]) },
            ClientFrame::HalfClose,
        ];

        for frame in &frames {
            writer.write_frame(frame).await.unwrap();
        }

        for expected in &frames {
            let got: ClientFrame = reader.read_frame().await.unwrap().unwrap();
            assert_eq!(&got, expected);
        }
    }

    #[tokio::test]
    async fn test_clean_close_reads_none() {
        let (client, server) = tokio::io::duplex(1024);
        let mut writer = FrameWriter::new(client);
        let mut reader = FrameReader::new(server);

        writer
            .write_frame(&ServerFrame::Status { status: Status::ok() })
            .await
            .unwrap();
        writer.shutdown().await.unwrap();
        drop(writer);

        let first: Option<ServerFrame> = reader.read_frame().await.unwrap();
        assert!(first.is_some());
        let second: Option<ServerFrame> = reader.read_frame().await.unwrap();
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn test_truncated_frame_is_transport_error() {
        let (mut client, server) = tokio::io::duplex(1024);
        let mut reader = FrameReader::new(server);

        client.write_all(&10u32.to_be_bytes()).await.unwrap();
        client.write_all(b"{\"ty").await.unwrap();
        drop(client);

        let result: Result<Option<ServerFrame>, _> = reader.read_frame().await;
        assert!(matches!(result, Err(FaultRpcError::Transport(_))));
    }

    #[tokio::test]
    async fn test_truncated_length_prefix_is_transport_error() {
        for cut in 1..4 {
            let (mut client, server) = tokio::io::duplex(1024);
            let mut reader = FrameReader::new(server);

            client.write_all(&10u32.to_be_bytes()[..cut]).await.unwrap();
            drop(client);

            let result: Result<Option<ServerFrame>, _> = reader.read_frame().await;
            assert!(
                matches!(result, Err(FaultRpcError::Transport(_))),
                "{} prefix bytes read as {:?}",
                cut,
                result
            );
        }
    }

    #[tokio::test]
    async fn test_oversized_length_prefix_rejected() {
        let (mut client, server) = tokio::io::duplex(1024);
        let mut reader = FrameReader::new(server);

        let len = (MAX_FRAME_SIZE + 1) as u32;
        client.write_all(&len.to_be_bytes()).await.unwrap();

        let result: Result<Option<ServerFrame>, _> = reader.read_frame().await;
        match result {
            Err(FaultRpcError::FrameTooLarge { size, max }) => {
                assert_eq!(size, MAX_FRAME_SIZE + 1);
                assert_eq!(max, MAX_FRAME_SIZE);
            }
            other => panic!("Expected FrameTooLarge, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_json_is_serialization_error() {
        let (mut client, server) = tokio::io::duplex(1024);
        let mut reader = FrameReader::new(server);

        let payload = b"not json";
        client.write_all(&(payload.len() as u32).to_be_bytes()).await.unwrap();
        client.write_all(payload).await.unwrap();

        let result: Result<Option<ServerFrame>, _> = reader.read_frame().await;
        assert!(matches!(result, Err(FaultRpcError::JsonSerialization(_))));
    }

    #[tokio::test]
    async fn test_server_message_frame() {
        let (client, server) = tokio::io::duplex(1024);
        let mut writer = FrameWriter::new(server);
        let mut reader = FrameReader::new(client);

        writer
            .write_frame(&ServerFrame::Message { response: FaultResponse::generated() })
            .await
            .unwrap();

        let frame: ServerFrame = reader.read_frame().await.unwrap().unwrap();
        assert_eq!(
            frame,
            ServerFrame::Message { response: FaultResponse::generated() }
        );
    }
}
