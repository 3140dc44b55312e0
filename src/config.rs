//! Network fetch configuration.
//!
//! Timeouts come from, in order: an explicit value (CLI flag or API argument), the
//! `FILEKIT_CONNECT_TIMEOUT_MS` / `FILEKIT_READ_TIMEOUT_MS` environment variables, and
//! finally the built-in defaults. A value of `0` means "no bound".

use std::time::Duration;

use crate::error::{FileKitError, Result};

pub const CONNECT_TIMEOUT_ENV: &str = "FILEKIT_CONNECT_TIMEOUT_MS";
pub const READ_TIMEOUT_ENV: &str = "FILEKIT_READ_TIMEOUT_MS";

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Bounds for a remote fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    /// Bound on establishing the connection. `None` waits indefinitely.
    pub connect_timeout: Option<Duration>,
    /// Bound on each individual wait for response data. `None` waits indefinitely.
    pub read_timeout: Option<Duration>,
    /// Honour `HTTP_PROXY` / `HTTPS_PROXY` from the environment.
    pub use_system_proxy: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Some(DEFAULT_CONNECT_TIMEOUT),
            read_timeout: Some(DEFAULT_READ_TIMEOUT),
            use_system_proxy: true,
        }
    }
}

impl FetchOptions {
    /// Builds options from millisecond values; `0` disables the corresponding bound.
    pub fn from_millis(connect_ms: u64, read_ms: u64) -> Self {
        Self {
            connect_timeout: millis(connect_ms),
            read_timeout: millis(read_ms),
            ..Self::default()
        }
    }

    /// Resolves each timeout from the explicit value, then the environment, then the default.
    pub fn resolve(connect_ms: Option<u64>, read_ms: Option<u64>) -> Result<Self> {
        Ok(Self {
            connect_timeout: timeout_from_opt_or_env(connect_ms, CONNECT_TIMEOUT_ENV, DEFAULT_CONNECT_TIMEOUT)?,
            read_timeout: timeout_from_opt_or_env(read_ms, READ_TIMEOUT_ENV, DEFAULT_READ_TIMEOUT)?,
            ..Self::default()
        })
    }

    pub fn without_proxy(mut self) -> Self {
        self.use_system_proxy = false;
        self
    }

    /// Bound on waiting for the response headers: connecting plus one read.
    ///
    /// An unbounded connect still leaves the read bound in force. An unbounded read leaves
    /// the wait open once the client's own connect timeout has passed.
    pub(crate) fn header_timeout(&self) -> Option<Duration> {
        match (self.connect_timeout, self.read_timeout) {
            (Some(connect), Some(read)) => Some(connect + read),
            (None, Some(read)) => Some(read),
            (_, None) => None,
        }
    }
}

fn millis(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}

fn timeout_from_opt_or_env(explicit: Option<u64>, var: &str, default: Duration) -> Result<Option<Duration>> {
    if let Some(ms) = explicit {
        return Ok(millis(ms));
    }
    match std::env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(millis)
            .map_err(|e| FileKitError::InvalidConfig(format!("{var}={raw:?}: {e}"))),
        Err(_) => Ok(Some(default)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_disables_a_bound() {
        let options = FetchOptions::from_millis(0, 250);
        assert_eq!(options.connect_timeout, None);
        assert_eq!(options.read_timeout, Some(Duration::from_millis(250)));
        assert_eq!(options.header_timeout(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn unbounded_read_leaves_headers_unbounded() {
        let options = FetchOptions::from_millis(250, 0);
        assert_eq!(options.connect_timeout, Some(Duration::from_millis(250)));
        assert_eq!(options.header_timeout(), None);
    }

    #[test]
    fn explicit_values_win() {
        let options = FetchOptions::resolve(Some(100), Some(200)).unwrap();
        assert_eq!(options.connect_timeout, Some(Duration::from_millis(100)));
        assert_eq!(options.read_timeout, Some(Duration::from_millis(200)));
        assert_eq!(options.header_timeout(), Some(Duration::from_millis(300)));
    }

    #[test]
    fn defaults_are_bounded() {
        let options = FetchOptions::default();
        assert_eq!(options.connect_timeout, Some(DEFAULT_CONNECT_TIMEOUT));
        assert_eq!(options.read_timeout, Some(DEFAULT_READ_TIMEOUT));
        assert!(!options.without_proxy().use_system_proxy);
    }
}
