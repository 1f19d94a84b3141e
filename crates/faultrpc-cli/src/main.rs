//! # FaultRPC CLI Entry Point
//!
//! Main binary for the FaultRPC resiliency server. Provides a command-line
//! interface for serving faults and for making calls against a server.
//!
//! ## Usage
//!
//! ```bash
//! # Start a server
//! faultrpc serve -b 0.0.0.0:9090 --location eu-west-1
//!
//! # Unary call that succeeds or fails with NOT_FOUND after 10-50ms
//! faultrpc call 127.0.0.1:9090 unary --min-delay-ms 10 --max-delay-ms 50 --code 0 --code 5
//!
//! # Take five messages from a server stream, with correlation metadata
//! faultrpc call 127.0.0.1:9090 server-stream --count 5 --metadata
//! ```

use std::time::Duration;

use anyhow::Result;
use argh::FromArgs;
use faultrpc_cli::{parse_metadata, parse_shape, run_call, CallPlan};
use faultrpc_common::FaultRequest;
use faultrpc_server::{FaultServer, ServerConfig};

/// Environment variable consulted when `--location` is not given
const LOCATION_ENV: &str = "FAULTRPC_LOCATION";

#[derive(FromArgs)]
/// FaultRPC - latency and failure injection for RPC clients
struct Cli {
    #[argh(subcommand)]
    command: Commands,
}

/// Available CLI subcommands.
///
/// - **Serve**: Start the fault-injecting server
/// - **Call**: Make a single call (unix-friendly JSON output)
#[derive(FromArgs)]
#[argh(subcommand)]
enum Commands {
    Serve(ServeArgs),
    Call(CallArgs),
}

/// Arguments for starting a FaultRPC server.
///
/// # Example
///
/// ```bash
/// faultrpc serve -b 0.0.0.0:9090 --location rack-7 --max-delay-ms 10000
/// ```
#[derive(FromArgs)]
#[argh(subcommand, name = "serve")]
/// start a FaultRPC server
struct ServeArgs {
    /// address to bind the server to
    ///
    /// Defaults to "0.0.0.0:9090".
    #[argh(option, short = 'b', default = "\"0.0.0.0:9090\".into()")]
    bind: String,

    /// location tag reported as `server-location` metadata
    ///
    /// Falls back to the FAULTRPC_LOCATION env var, then to "localhost".
    #[argh(option, long = "location")]
    location: Option<String>,

    /// largest delay a client may request, in milliseconds
    ///
    /// Requests asking for longer delays are rejected with INVALID_ARGUMENT.
    /// Defaults to 60000ms (60 seconds). Must be at most 3600000 (1 hour).
    #[argh(option, long = "max-delay-ms", default = "60000")]
    max_delay_ms: u64,

    /// outbound messages buffered per call
    #[argh(option, long = "channel-capacity", default = "16")]
    channel_capacity: usize,
}

/// Arguments for making a single call.
///
/// Responses are written to stdout as raw JSON, one per line. Response
/// headers and the final status go to stderr. The exit code is non-zero
/// when the call ends with anything but OK.
///
/// # Examples
///
/// ```bash
/// # Bidirectional call sending three requests
/// faultrpc call 127.0.0.1:9090 bidi-stream --count 3 --code 0 --code 10
///
/// # Pipe output to jq
/// faultrpc call 127.0.0.1:9090 unary | jq '.message'
/// ```
#[derive(FromArgs)]
#[argh(subcommand, name = "call")]
/// make a call against a FaultRPC server
struct CallArgs {
    /// address of the server to call
    #[argh(positional)]
    server_address: String,

    /// call shape: unary, server-stream, client-stream or bidi-stream
    #[argh(positional)]
    shape: String,

    /// lower delay bound in milliseconds
    #[argh(option, long = "min-delay-ms", default = "0")]
    min_delay_ms: u64,

    /// upper delay bound in milliseconds
    #[argh(option, long = "max-delay-ms", default = "0")]
    max_delay_ms: u64,

    /// candidate outcome code, repeatable
    ///
    /// Defaults to 0 (OK) alone.
    #[argh(option, long = "code")]
    codes: Vec<u32>,

    /// requests to send, or messages to take from a server stream
    #[argh(option, short = 'n', long = "count", default = "1")]
    count: u64,

    /// request metadata as key=value, repeatable
    #[argh(option, short = 'H', long = "header")]
    headers: Vec<String>,

    /// exchange correlation metadata with the server
    #[argh(switch, long = "metadata")]
    metadata: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli: Cli = argh::from_env();

    // call: keep output clean for unix tool usage (piping to jq, etc.)
    if !matches!(cli.command, Commands::Call(_)) {
        // Set default log level to INFO, but allow RUST_LOG env var to override
        let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    match cli.command {
        Commands::Serve(args) => run_serve(args).await,
        Commands::Call(args) => run_call_command(args).await,
    }
}

/// Executes the `serve` subcommand until Ctrl-C.
async fn run_serve(args: ServeArgs) -> Result<()> {
    let config = server_config(&args, std::env::var(LOCATION_ENV).ok());

    tracing::info!("Starting FaultRPC server");
    tracing::info!("Binding to: {}", args.bind);
    tracing::info!("Location: {}", config.location);
    tracing::info!("Maximum delay: {}ms", args.max_delay_ms);

    let server = FaultServer::bind(&args.bind, config).await?;
    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await?;

    Ok(())
}

/// Builds the server configuration. Priority for the location: CLI flag >
/// env var > default.
fn server_config(args: &ServeArgs, env_location: Option<String>) -> ServerConfig {
    let mut config = ServerConfig::new()
        .with_max_delay(Duration::from_millis(args.max_delay_ms))
        .with_channel_capacity(args.channel_capacity);

    if let Some(location) = args.location.clone().or(env_location) {
        config = config.with_location(location);
    }
    config
}

/// Executes the `call` subcommand.
async fn run_call_command(args: CallArgs) -> Result<()> {
    let plan = call_plan(&args)?;

    let mut stdout = std::io::stdout().lock();
    let mut stderr = std::io::stderr();
    let status = run_call(&args.server_address, &plan, &mut stdout, &mut stderr).await?;

    eprintln!("status: {}", status);
    if !status.is_ok() {
        std::process::exit(1);
    }
    Ok(())
}

fn call_plan(args: &CallArgs) -> Result<CallPlan> {
    let codes = if args.codes.is_empty() {
        vec![0]
    } else {
        args.codes.clone()
    };

    Ok(CallPlan {
        shape: parse_shape(&args.shape)?,
        request: FaultRequest::new(codes).with_delay_ms(args.min_delay_ms, args.max_delay_ms),
        count: args.count,
        metadata: parse_metadata(&args.headers)?,
        exchange_metadata: args.metadata,
    })
}
