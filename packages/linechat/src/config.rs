//! Session configuration.

use std::time::Duration;
use thiserror::Error;


/// How long a blocking keyboard or socket read waits before re-checking for shutdown.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);


/// Everything a session needs to know at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// UDP port to listen on. 0 picks an ephemeral port.
    pub local_port: u16,
    /// Host name or IPv4 address of the peer
    pub remote_host: String,
    /// UDP port the peer listens on
    pub remote_port: u16,
    /// Upper bound on how long a stage can stay blocked in a read without noticing shutdown
    pub poll_interval: Duration,
}

/// Invalid [`ChatConfig`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("remote port must not be 0")]
    ZeroRemotePort,
    #[error("remote host must not be empty")]
    EmptyRemoteHost,
    #[error("poll interval must be non-zero")]
    ZeroPollInterval,
}

impl ChatConfig {
    /// Construct with the default poll interval
    pub fn new(local_port: u16, remote_host: impl Into<String>, remote_port: u16) -> Self {
        ChatConfig {
            local_port,
            remote_host: remote_host.into(),
            remote_port,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Ownership-chaining setter for [`poll_interval`](Self::poll_interval)
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Check the values that can't be rejected by their types alone
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.remote_port == 0 {
            return Err(ConfigError::ZeroRemotePort);
        }
        if self.remote_host.trim().is_empty() {
            return Err(ConfigError::EmptyRemoteHost);
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::ZeroPollInterval);
        }
        Ok(())
    }
}
