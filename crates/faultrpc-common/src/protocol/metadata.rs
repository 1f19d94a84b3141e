//! Out-of-band call metadata.
//!
//! Metadata is a flat string map exchanged alongside payload messages. It is
//! used for tracing only and never drives control flow.

use std::collections::BTreeMap;

/// Key/value metadata attached to a call.
pub type Metadata = BTreeMap<String, String>;

/// Wall-clock time on the server when the metadata was produced (`HH:MM:SS`)
pub const SERVER_TIME: &str = "server-time";

/// Fixed tag naming where the server runs
pub const SERVER_LOCATION: &str = "server-location";

/// Unique identifier generated for each metadata send
pub const RESPONSE_ID: &str = "response-id";
