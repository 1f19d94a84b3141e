//! Client Integration Tests
//!
//! These tests run the client against a scripted server that speaks the
//! frame protocol directly, to check how the client interprets each
//! sequence of server frames:
//! - Headers are captured before the payload
//! - Non-OK statuses surface as `FaultRpcError::Status`
//! - A connection closed without a status is a transport error
//! - Cancellation drains to the final status

use faultrpc_client::FaultClient;
use faultrpc_common::protocol::{
    CallShape, ClientFrame, FaultRequest, FaultResponse, FaultRpcError, Metadata, ServerFrame,
    ServiceKind, Status, StatusCode,
};
use faultrpc_common::transport::TcpTransport;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Accepts one connection, records the frames the client sent until it
/// half-closes or cancels, then replies with `script`.
async fn scripted_server(script: Vec<ServerFrame>) -> (String, oneshot::Receiver<Vec<ClientFrame>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    let (seen_tx, seen_rx) = oneshot::channel();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let (mut reader, mut writer) = TcpTransport::split(stream);

        let mut seen = Vec::new();
        while let Some(frame) = reader.read_frame::<ClientFrame>().await.unwrap() {
            let done = matches!(frame, ClientFrame::HalfClose | ClientFrame::Cancel);
            seen.push(frame);
            if done {
                break;
            }
        }

        for frame in &script {
            writer.write_frame(frame).await.unwrap();
        }
        writer.shutdown().await.unwrap();
        let _ = seen_tx.send(seen);
    });

    (addr, seen_rx)
}

fn metadata(pairs: &[(&str, &str)]) -> Metadata {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[tokio::test]
async fn test_unary_sends_open_message_half_close() {
    let (addr, seen) = scripted_server(vec![
        ServerFrame::Message { response: FaultResponse::generated() },
        ServerFrame::Status { status: Status::ok() },
    ])
    .await;

    let client = FaultClient::new(addr);
    let request = FaultRequest::new(vec![0]).with_delay_ms(1, 2);
    let reply = client
        .unary(request.clone(), metadata(&[("trace", "t-1")]))
        .await
        .unwrap();

    assert_eq!(reply.response, FaultResponse::generated());
    assert!(reply.headers.is_none());

    let frames = seen.await.unwrap();
    assert_eq!(
        frames,
        vec![
            ClientFrame::Open {
                service: ServiceKind::Resiliency,
                shape: CallShape::Unary,
                metadata: metadata(&[("trace", "t-1")]),
            },
            ClientFrame::Message { request },
            ClientFrame::HalfClose,
        ]
    );
}

#[tokio::test]
async fn test_unary_captures_headers() {
    let (addr, _seen) = scripted_server(vec![
        ServerFrame::Headers { metadata: metadata(&[("server-location", "lab")]) },
        ServerFrame::Message { response: FaultResponse::generated() },
        ServerFrame::Status { status: Status::ok() },
    ])
    .await;

    let client = FaultClient::new(addr).with_metadata_exchange();
    let reply = client.unary(FaultRequest::new(vec![0]), Metadata::new()).await.unwrap();

    let headers = reply.headers.unwrap();
    assert_eq!(headers["server-location"], "lab");
}

#[tokio::test]
async fn test_unary_fault_surfaces_status() {
    let (addr, _seen) = scripted_server(vec![ServerFrame::Status {
        status: Status::new(StatusCode::NotFound, "Generated by server"),
    }])
    .await;

    let client = FaultClient::new(addr);
    let err = client
        .unary(FaultRequest::new(vec![5]), Metadata::new())
        .await
        .unwrap_err();

    let status = err.status().unwrap();
    assert_eq!(status.code, StatusCode::NotFound);
    assert_eq!(status.message, "Generated by server");
}

#[tokio::test]
async fn test_missing_status_is_transport_error() {
    let (addr, _seen) = scripted_server(vec![ServerFrame::Message {
        response: FaultResponse::generated(),
    }])
    .await;

    let client = FaultClient::new(addr);
    let err = client
        .unary(FaultRequest::new(vec![0]), Metadata::new())
        .await
        .unwrap_err();
    assert!(matches!(err, FaultRpcError::Transport(_)));
}

#[tokio::test]
async fn test_client_stream_summary() {
    let (addr, seen) = scripted_server(vec![
        ServerFrame::Message { response: FaultResponse::received(2) },
        ServerFrame::Status { status: Status::ok() },
    ])
    .await;

    let client = FaultClient::new(addr);
    let mut call = client.client_stream(Metadata::new()).await.unwrap();
    call.send(FaultRequest::new(vec![0])).await.unwrap();
    call.send(FaultRequest::new(vec![0])).await.unwrap();

    let response = call.close_and_recv().await.unwrap();
    assert_eq!(response.message, "Received 2 requests from client");

    let frames = seen.await.unwrap();
    assert_eq!(frames.len(), 4);
    assert_eq!(frames[3], ClientFrame::HalfClose);
}

#[tokio::test]
async fn test_bidi_reads_until_status() {
    let (addr, _seen) = scripted_server(vec![
        ServerFrame::Message { response: FaultResponse::generated() },
        ServerFrame::Message { response: FaultResponse::generated() },
        ServerFrame::Status { status: Status::ok() },
    ])
    .await;

    let client = FaultClient::new(addr);
    let mut call = client.bidi_stream(Metadata::new()).await.unwrap();
    call.close_send().await.unwrap();

    assert!(call.message().await.unwrap().is_some());
    assert!(call.message().await.unwrap().is_some());
    assert!(call.message().await.unwrap().is_none());
    assert_eq!(call.status(), Some(&Status::ok()));

    // Once ended, the call keeps reporting the end.
    assert!(call.message().await.unwrap().is_none());
}

#[tokio::test]
async fn test_cancel_drains_to_status() {
    let (addr, seen) = scripted_server(vec![
        ServerFrame::Message { response: FaultResponse::generated() },
        ServerFrame::Status { status: Status::cancelled("Client cancelled request") },
    ])
    .await;

    let client = FaultClient::new(addr);
    let mut call = client.bidi_stream(Metadata::new()).await.unwrap();

    let status = call.cancel().await.unwrap();
    assert_eq!(status.code, StatusCode::Cancelled);

    let frames = seen.await.unwrap();
    assert_eq!(frames.last(), Some(&ClientFrame::Cancel));
}
