//! Timeout configuration forwarded to the HTTP engine.
//!
//! # Timeout Types
//!
//! - **connect**: TCP + TLS handshake timeout
//! - **socket**: Maximum time between received bytes (SO_TIMEOUT)
//!
//! Values are kept in milliseconds so they load directly from configuration
//! files; `0` disables the timeout.
//!
//! # Usage
//!
//! ```rust
//! use artifact_transport::TimeoutSettings;
//! use std::time::Duration;
//!
//! let timeouts = TimeoutSettings::new()
//!     .connect(Duration::from_secs(5))
//!     .socket(Duration::from_secs(60));
//! assert_eq!(timeouts.connect_timeout(), Some(Duration::from_secs(5)));
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default connect and socket timeout, in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Connect and socket timeouts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutSettings {
    /// Timeout for establishing a connection, in milliseconds.
    ///
    /// Default: 30s
    pub connect_ms: u64,

    /// Socket read timeout, in milliseconds.
    ///
    /// **Resets on each successful read.** Detects hung transfers without
    /// capping long downloads.
    ///
    /// Default: 30s
    pub socket_ms: u64,
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            connect_ms: DEFAULT_TIMEOUT_MS,
            socket_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl TimeoutSettings {
    /// Create timeouts with the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set connect timeout.
    pub fn connect(mut self, timeout: Duration) -> Self {
        self.connect_ms = duration_ms(timeout);
        self
    }

    /// Set socket timeout.
    pub fn socket(mut self, timeout: Duration) -> Self {
        self.socket_ms = duration_ms(timeout);
        self
    }

    /// Disable connect timeout.
    pub fn no_connect_timeout(mut self) -> Self {
        self.connect_ms = 0;
        self
    }

    /// Disable socket timeout.
    pub fn no_socket_timeout(mut self) -> Self {
        self.socket_ms = 0;
        self
    }

    /// Connect timeout, `None` when disabled.
    pub fn connect_timeout(&self) -> Option<Duration> {
        non_zero(self.connect_ms)
    }

    /// Socket timeout, `None` when disabled.
    pub fn socket_timeout(&self) -> Option<Duration> {
        non_zero(self.socket_ms)
    }
}

fn duration_ms(timeout: Duration) -> u64 {
    u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX)
}

fn non_zero(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let t = TimeoutSettings::default();
        assert_eq!(t.connect_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(t.socket_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_builder_pattern() {
        let t = TimeoutSettings::new()
            .connect(Duration::from_millis(1500))
            .no_socket_timeout();

        assert_eq!(t.connect_ms, 1500);
        assert_eq!(t.connect_timeout(), Some(Duration::from_millis(1500)));
        assert_eq!(t.socket_timeout(), None);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let t: TimeoutSettings = serde_json::from_str(r#"{"socket_ms": 120000}"#).unwrap();
        assert_eq!(t.connect_ms, DEFAULT_TIMEOUT_MS);
        assert_eq!(t.socket_timeout(), Some(Duration::from_secs(120)));
    }
}
