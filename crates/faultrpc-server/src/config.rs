//! Server configuration.
//!
//! Settings that bound what clients may ask for and how calls are buffered.

use std::time::Duration;

/// Default reported `server-location`.
pub const DEFAULT_LOCATION: &str = "localhost";

/// Default ceiling on a requested max delay.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(60);

/// Default outbound frames buffered per call.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 16;

/// Configuration for a [`FaultServer`](crate::FaultServer).
///
/// # Fields
///
/// - `location` - Value reported as `server-location` (default: `localhost`)
/// - `max_delay` - Largest `max_delay_ms` a client may request (default: 60 seconds)
/// - `channel_capacity` - Outbound frames buffered per call (default: 16)
///
/// # Example
///
/// ```
/// use faultrpc_server::ServerConfig;
/// use std::time::Duration;
///
/// let config = ServerConfig::new()
///     .with_location("eu-west-1")
///     .with_max_delay(Duration::from_secs(5));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Reported by the metadata-decorated service
    pub location: String,
    /// Requests asking for longer delays are rejected
    pub max_delay: Duration,
    /// Outbound channel size per call
    pub channel_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            location: DEFAULT_LOCATION.to_string(),
            max_delay: DEFAULT_MAX_DELAY,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl ServerConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the reported server location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Sets the largest delay a client may request.
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Sets how many outbound frames a call may buffer.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Channel capacity is zero
    /// - Location is empty
    /// - Max delay is excessively long (> 1 hour)
    pub fn validate(&self) -> Result<(), String> {
        if self.channel_capacity == 0 {
            return Err("channel capacity must be greater than zero".to_string());
        }

        if self.location.trim().is_empty() {
            return Err("location must not be empty".to_string());
        }

        if self.max_delay.as_secs() > 3600 {
            return Err(format!(
                "max delay must be <= 1 hour (got {} seconds)",
                self.max_delay.as_secs()
            ));
        }

        Ok(())
    }
}
