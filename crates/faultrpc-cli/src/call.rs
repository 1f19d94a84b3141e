//! The `call` subcommand.
//!
//! Drives one call of any shape and writes every response as one line of
//! raw JSON, so output can be piped into tools like `jq`.

use std::io::Write;

use anyhow::{anyhow, Result};
use faultrpc_client::FaultClient;
use faultrpc_common::protocol::{CallShape, FaultRequest, FaultRpcError, Metadata, Status};

/// What a single `call` invocation should do.
#[derive(Debug, Clone, PartialEq)]
pub struct CallPlan {
    pub shape: CallShape,
    /// Sent once for unary and server-stream calls, `count` times otherwise
    pub request: FaultRequest,
    /// Messages to send or, for server streams, to receive before cancelling
    pub count: u64,
    pub metadata: Metadata,
    /// Use the metadata-exchanging service
    pub exchange_metadata: bool,
}

/// Parses a call shape name. Dashes and underscores are interchangeable.
pub fn parse_shape(value: &str) -> Result<CallShape> {
    match value.replace('-', "_").as_str() {
        "unary" => Ok(CallShape::Unary),
        "server_stream" => Ok(CallShape::ServerStream),
        "client_stream" => Ok(CallShape::ClientStream),
        "bidi_stream" | "bidi" => Ok(CallShape::BidiStream),
        _ => Err(anyhow!(
            "Invalid call shape '{}': expected unary, server-stream, client-stream or bidi-stream",
            value
        )),
    }
}

/// Parses `key=value` pairs into call metadata.
pub fn parse_metadata(pairs: &[String]) -> Result<Metadata> {
    pairs
        .iter()
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
            _ => Err(anyhow!("Invalid metadata '{}': expected key=value", pair)),
        })
        .collect()
}

/// Runs `plan` against the server at `addr`, writing responses to `out`.
///
/// Returns the call's final status; faults are a normal outcome here, not
/// an error. Response headers, when present, are written to `headers_out`.
pub async fn run_call<W: Write, H: Write>(
    addr: &str,
    plan: &CallPlan,
    out: &mut W,
    headers_out: &mut H,
) -> Result<Status> {
    let mut client = FaultClient::new(addr);
    if plan.exchange_metadata {
        client = client.with_metadata_exchange();
    }

    match drive(&client, plan, out, headers_out).await {
        Ok(status) => Ok(status),
        Err(FaultRpcError::Status(status)) => Ok(status),
        Err(err) => Err(err.into()),
    }
}

async fn drive<W: Write, H: Write>(
    client: &FaultClient,
    plan: &CallPlan,
    out: &mut W,
    headers_out: &mut H,
) -> faultrpc_common::Result<Status> {
    let metadata = plan.metadata.clone();

    match plan.shape {
        CallShape::Unary => {
            let reply = client.unary(plan.request.clone(), metadata).await?;
            print_headers(headers_out, reply.headers.as_ref())?;
            print_json(out, &reply.response)?;
            Ok(Status::ok())
        }
        CallShape::ServerStream => {
            let mut stream = client.server_stream(plan.request.clone(), metadata).await?;
            for _ in 0..plan.count {
                match stream.message().await? {
                    Some(response) => print_json(out, &response)?,
                    None => break,
                }
            }
            print_headers(headers_out, stream.headers())?;

            match stream.status() {
                Some(status) => Ok(status.clone()),
                None => stream.cancel().await,
            }
        }
        CallShape::ClientStream => {
            let mut stream = client.client_stream(metadata).await?;
            for _ in 0..plan.count {
                stream.send(plan.request.clone()).await?;
            }
            let response = stream.close_and_recv().await?;
            print_headers(headers_out, stream.headers())?;
            print_json(out, &response)?;
            Ok(Status::ok())
        }
        CallShape::BidiStream => {
            let mut stream = client.bidi_stream(metadata).await?;
            for _ in 0..plan.count {
                stream.send(plan.request.clone()).await?;
                match stream.message().await? {
                    Some(response) => print_json(out, &response)?,
                    None => break,
                }
            }
            print_headers(headers_out, stream.headers())?;

            if stream.status().is_none() {
                stream.close_send().await?;
                while let Some(response) = stream.message().await? {
                    print_json(out, &response)?;
                }
            }
            Ok(stream.status().cloned().unwrap_or_else(Status::ok))
        }
    }
}

fn print_json<W: Write, T: serde::Serialize>(out: &mut W, value: &T) -> faultrpc_common::Result<()> {
    writeln!(out, "{}", serde_json::to_string(value)?)?;
    Ok(())
}

fn print_headers<H: Write>(out: &mut H, headers: Option<&Metadata>) -> faultrpc_common::Result<()> {
    if let Some(headers) = headers {
        writeln!(out, "headers: {}", serde_json::to_string(headers)?)?;
    }
    Ok(())
}
