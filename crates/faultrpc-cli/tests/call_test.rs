//! Call Command Integration Tests
//!
//! Runs the `call` command logic against a live server and checks what it
//! writes: one JSON response per line on the output, headers on the side.

use faultrpc_cli::{run_call, CallPlan};
use faultrpc_common::protocol::{CallShape, FaultRequest, FaultResponse, Metadata, StatusCode};
use faultrpc_server::{FaultServer, ServerConfig};

// ============================================================================
// Test Helpers
// ============================================================================

async fn start_server() -> String {
    let config = ServerConfig::new().with_location("cli-test");
    let server = FaultServer::bind("127.0.0.1:0", config).await.unwrap();
    let addr = server.local_addr().unwrap().to_string();
    tokio::spawn(server.run());
    addr
}

fn plan(shape: CallShape, codes: Vec<u32>, count: u64) -> CallPlan {
    CallPlan {
        shape,
        request: FaultRequest::new(codes),
        count,
        metadata: Metadata::new(),
        exchange_metadata: false,
    }
}

fn lines(out: &[u8]) -> Vec<FaultResponse> {
    String::from_utf8(out.to_vec())
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_unary_prints_one_line() {
    let addr = start_server().await;
    let (mut out, mut headers) = (Vec::new(), Vec::new());

    let status = run_call(&addr, &plan(CallShape::Unary, vec![0], 1), &mut out, &mut headers)
        .await
        .unwrap();

    assert_eq!(status.code, StatusCode::Ok);
    assert_eq!(lines(&out), vec![FaultResponse::generated()]);
    assert!(headers.is_empty());
}

#[tokio::test]
async fn test_fault_is_reported_as_status() {
    let addr = start_server().await;
    let (mut out, mut headers) = (Vec::new(), Vec::new());

    let status = run_call(&addr, &plan(CallShape::Unary, vec![16], 1), &mut out, &mut headers)
        .await
        .unwrap();

    assert_eq!(status.code, StatusCode::Unauthenticated);
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_server_stream_takes_count_then_cancels() {
    let addr = start_server().await;
    let (mut out, mut headers) = (Vec::new(), Vec::new());

    let status = run_call(&addr, &plan(CallShape::ServerStream, vec![0], 4), &mut out, &mut headers)
        .await
        .unwrap();

    assert_eq!(status.code, StatusCode::Cancelled);
    assert_eq!(lines(&out).len(), 4);
}

#[tokio::test]
async fn test_client_stream_summary_line() {
    let addr = start_server().await;
    let (mut out, mut headers) = (Vec::new(), Vec::new());

    let status = run_call(&addr, &plan(CallShape::ClientStream, vec![0], 3), &mut out, &mut headers)
        .await
        .unwrap();

    assert_eq!(status.code, StatusCode::Ok);
    assert_eq!(lines(&out), vec![FaultResponse::received(3)]);
}

#[tokio::test]
async fn test_bidi_with_metadata_exchange() {
    let addr = start_server().await;
    let (mut out, mut headers) = (Vec::new(), Vec::new());

    let mut bidi = plan(CallShape::BidiStream, vec![0], 2);
    bidi.exchange_metadata = true;
    let status = run_call(&addr, &bidi, &mut out, &mut headers).await.unwrap();

    assert_eq!(status.code, StatusCode::Ok);
    assert_eq!(lines(&out).len(), 2);

    let headers = String::from_utf8(headers).unwrap();
    assert!(headers.starts_with("headers: "));
    assert!(headers.contains("\"server-location\":\"cli-test\""));
}

#[tokio::test]
async fn test_unreachable_server_is_an_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    drop(listener);

    let (mut out, mut headers) = (Vec::new(), Vec::new());
    let result = run_call(&addr, &plan(CallShape::Unary, vec![0], 1), &mut out, &mut headers).await;
    assert!(result.is_err());
}
