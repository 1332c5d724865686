//! Wait Mechanisms
//!
//! Blocking, bounded polling used by `wait_until`, `wait_step` and the
//! scroll-search loop. Every wait has a timeout; there is no other form of
//! cancellation.

use std::time::{Duration, Instant};

use crate::error::{ScreenError, ScreenResult};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for wait operations (5 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 5_000;

/// Default polling interval (250ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 250;

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
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
// SEARCH STATE
// =============================================================================

/// State of a bounded probe-then-act search.
///
/// `Found` and `Exhausted` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    /// Still probing
    Searching {
        /// Probes performed so far
        attempts: u32,
    },
    /// The probe succeeded
    Found {
        /// Probes performed, including the successful one
        attempts: u32,
    },
    /// The timeout elapsed first
    Exhausted {
        /// Probes performed
        attempts: u32,
    },
}

impl SearchState {
    /// Whether the search is over
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Searching { .. })
    }

    /// Whether the probe succeeded
    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }

    /// Number of probes performed
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        match self {
            Self::Searching { attempts }
            | Self::Found { attempts }
            | Self::Exhausted { attempts } => *attempts,
        }
    }
}

// =============================================================================
// WAIT CONDITION TRAIT
// =============================================================================

/// Trait for custom wait conditions
pub trait WaitCondition {
    /// Check if the condition is satisfied
    fn check(&mut self) -> bool;

    /// Get description for error messages
    fn description(&self) -> String;
}

/// A function-based wait condition
pub struct FnCondition<F: FnMut() -> bool> {
    func: F,
    description: String,
}

impl<F: FnMut() -> bool> std::fmt::Debug for FnCondition<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnCondition")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl<F: FnMut() -> bool> FnCondition<F> {
    /// Create a new function condition
    pub fn new(func: F, description: impl Into<String>) -> Self {
        Self {
            func,
            description: description.into(),
        }
    }
}

impl<F: FnMut() -> bool> WaitCondition for FnCondition<F> {
    fn check(&mut self) -> bool {
        (self.func)()
    }

    fn description(&self) -> String {
        self.description.clone()
    }
}

// =============================================================================
// WAIT RESULT
// =============================================================================

/// Result of a successful wait
#[derive(Debug, Clone)]
pub struct WaitResult {
    /// Time spent waiting
    pub elapsed: Duration,
    /// Description of what was waited for
    pub waited_for: String,
}

// =============================================================================
// WAITER IMPLEMENTATION
// =============================================================================

/// Waiter for synchronization operations
#[derive(Debug, Clone, Copy, Default)]
pub struct Waiter {
    options: WaitOptions,
}

impl Waiter {
    /// Create a new waiter with default options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom options
    #[must_use]
    pub const fn with_options(options: WaitOptions) -> Self {
        Self { options }
    }

    /// Options in effect
    #[must_use]
    pub const fn options(&self) -> &WaitOptions {
        &self.options
    }

    /// Wait for a custom condition
    pub fn wait_for<C: WaitCondition>(&self, condition: &mut C) -> ScreenResult<WaitResult> {
        let start = Instant::now();
        let timeout = self.options.timeout();

        loop {
            if condition.check() {
                return Ok(WaitResult {
                    elapsed: start.elapsed(),
                    waited_for: condition.description(),
                });
            }
            let remaining = timeout.saturating_sub(start.elapsed());
            if remaining.is_zero() {
                return Err(ScreenError::Timeout {
                    message: condition.description(),
                    ms: self.options.timeout_ms,
                });
            }
            std::thread::sleep(self.options.poll_interval().min(remaining));
        }
    }

    /// Wait for function/predicate to return true
    pub fn wait_for_function<F>(
        &self,
        predicate: F,
        message: impl Into<String>,
    ) -> ScreenResult<WaitResult>
    where
        F: FnMut() -> bool,
    {
        self.wait_for(&mut FnCondition::new(predicate, message))
    }

    /// Probe until `probe` succeeds or the timeout elapses.
    ///
    /// The probe always runs at least once. After every miss with time left,
    /// `between` runs once (a scroll, typically) and the waiter sleeps for
    /// `min(poll_interval, remaining)`. Errors from `between` end the search.
    pub fn search<P, B>(&self, mut probe: P, mut between: B) -> ScreenResult<SearchState>
    where
        P: FnMut() -> bool,
        B: FnMut() -> ScreenResult<()>,
    {
        let start = Instant::now();
        let timeout = self.options.timeout();
        let mut state = SearchState::Searching { attempts: 0 };

        while let SearchState::Searching { attempts } = state {
            let attempts = attempts + 1;
            if probe() {
                state = SearchState::Found { attempts };
                continue;
            }
            let remaining = timeout.saturating_sub(start.elapsed());
            if remaining.is_zero() {
                state = SearchState::Exhausted { attempts };
                continue;
            }
            tracing::trace!(attempts, ?remaining, "search probe missed");
            between()?;
            std::thread::sleep(self.options.poll_interval().min(remaining));
            state = SearchState::Searching { attempts };
        }

        Ok(state)
    }
}

// =============================================================================
// CONVENIENCE FUNCTIONS
// =============================================================================

/// Wait for a condition, failing with `message` on timeout
pub fn wait_until<F>(predicate: F, message: &str, options: WaitOptions) -> ScreenResult<()>
where
    F: FnMut() -> bool,
{
    Waiter::with_options(options).wait_for_function(predicate, message)?;
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
