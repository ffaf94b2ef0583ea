//! Wait Mechanisms
//!
//! Playwright-compatible synchronous polling. Every wait is a blocking loop
//! on the calling thread that re-checks a predicate at a fixed interval until
//! it holds or the deadline passes.

use crate::result::{StubError, StubResult};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::trace;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for `wait_for_selector` (1 second)
pub const DEFAULT_SELECTOR_TIMEOUT_MS: u64 = 1_000;

/// Polling interval for `wait_for_selector` (10ms)
pub const SELECTOR_POLL_INTERVAL_MS: u64 = 10;

/// Default timeout for `wait_for_function` (10 seconds)
pub const DEFAULT_FUNCTION_TIMEOUT_MS: u64 = 10_000;

/// Polling interval for `wait_for_function` (50ms)
pub const FUNCTION_POLL_INTERVAL_MS: u64 = 50;

// =============================================================================
// LOAD STATE
// =============================================================================

/// Page load states accepted by `goto` (Playwright parity)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
    /// Wait for the `load` event to fire
    #[default]
    Load,
    /// Wait for `DOMContentLoaded` event
    DomContentLoaded,
    /// Wait for network to be idle
    NetworkIdle,
    /// Wait for the navigation response only
    Commit,
}

impl LoadState {
    /// Get the Playwright `wait_until` name for this load state
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::DomContentLoaded => "domcontentloaded",
            Self::NetworkIdle => "networkidle",
            Self::Commit => "commit",
        }
    }

    /// Parse a `wait_until` name (case-insensitive)
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "load" => Some(Self::Load),
            "domcontentloaded" => Some(Self::DomContentLoaded),
            "networkidle" => Some(Self::NetworkIdle),
            "commit" => Some(Self::Commit),
            _ => None,
        }
    }
}

impl std::fmt::Display for LoadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self::for_function()
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults used by `wait_for_selector`
    #[must_use]
    pub const fn for_selector() -> Self {
        Self {
            timeout_ms: DEFAULT_SELECTOR_TIMEOUT_MS,
            poll_interval_ms: SELECTOR_POLL_INTERVAL_MS,
        }
    }

    /// Defaults used by `wait_for_function`
    #[must_use]
    pub const fn for_function() -> Self {
        Self {
            timeout_ms: DEFAULT_FUNCTION_TIMEOUT_MS,
            poll_interval_ms: FUNCTION_POLL_INTERVAL_MS,
        }
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// =============================================================================
// WAIT RESULT
// =============================================================================

/// Result of a successful wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitResult {
    /// Time spent waiting
    pub elapsed: Duration,
    /// Number of predicate checks performed
    pub attempts: u32,
    /// Description of what was waited for
    pub waited_for: String,
}

// =============================================================================
// POLLING
// =============================================================================

/// Check `predicate` until it returns true or the timeout elapses.
///
/// The predicate is checked at least once, even with a zero timeout. Errors
/// from the predicate end the wait immediately. The final sleep is clipped
/// to the deadline so a timeout is reported close to `timeout_ms`.
pub fn poll_until<F>(
    options: &WaitOptions,
    waited_for: &str,
    mut predicate: F,
) -> StubResult<WaitResult>
where
    F: FnMut() -> StubResult<bool>,
{
    let start = Instant::now();
    let timeout = options.timeout();
    let poll_interval = options.poll_interval();
    let mut attempts: u32 = 0;

    loop {
        attempts = attempts.saturating_add(1);
        if predicate()? {
            trace!(waited_for, attempts, "wait satisfied");
            return Ok(WaitResult {
                elapsed: start.elapsed(),
                attempts,
                waited_for: waited_for.to_string(),
            });
        }

        let elapsed = start.elapsed();
        if elapsed >= timeout {
            break;
        }
        std::thread::sleep(poll_interval.min(timeout - elapsed));
    }

    trace!(waited_for, attempts, "wait timed out");
    Err(StubError::timeout(options.timeout_ms, waited_for))
}

// =============================================================================
// TESTS
// =============================================================================
