//! Circuit breaker guarding upstream calls.
//!
//! The breaker opens after a run of consecutive failures and auto-closes
//! through a time-based check performed at call time; there is no
//! background timer. It is an explicitly constructed component owned by
//! the composition root and shared by handle, never a module-level global.
//!
//! The failure count is a coarse protective heuristic, not a correctness
//! counter, so a single async mutex around the whole state is enough.

use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Consecutive failures before the breaker opens.
const FAILURE_THRESHOLD: u32 = 5;

/// How long the breaker stays open after the last failure.
const COOLDOWN: Duration = Duration::from_secs(60);

#[derive(Debug, Default)]
struct BreakerState {
    failures: u32,
    last_failure: Option<Instant>,
    open: bool,
}

/// Snapshot of breaker state for health reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerStatus {
    pub open: bool,
    pub failures: u32,
}

impl BreakerStatus {
    pub fn as_str(&self) -> &'static str {
        if self.open { "open" } else { "closed" }
    }
}

/// Tracks upstream health and gates whether a call is attempted.
#[derive(Debug)]
pub struct CircuitBreaker {
    state: Mutex<BreakerState>,
    threshold: u32,
    cooldown: Duration,
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new()
    }
}

impl CircuitBreaker {
    /// Breaker with the fixed production policy (5 failures, 60s cooldown).
    pub fn new() -> Self {
        Self::with_policy(FAILURE_THRESHOLD, COOLDOWN)
    }

    /// Breaker with an explicit policy, used by tests.
    pub fn with_policy(threshold: u32, cooldown: Duration) -> Self {
        Self { state: Mutex::new(BreakerState::default()), threshold, cooldown }
    }

    /// Whether a call may proceed right now.
    ///
    /// If the breaker is open and the cooldown has elapsed since the last
    /// failure, it closes again with the failure count zeroed and the call
    /// proceeds (half-open retry). Otherwise an open breaker rejects the
    /// call without any I/O.
    pub async fn try_acquire(&self) -> bool {
        let mut state = self.state.lock().await;
        if !state.open {
            return true;
        }

        let cooled_down = state
            .last_failure
            .map(|at| at.elapsed() > self.cooldown)
            .unwrap_or(true);
        if cooled_down {
            tracing::info!("circuit breaker reset after cooldown");
            state.open = false;
            state.failures = 0;
            return true;
        }

        false
    }

    /// Record a successful call, clearing the failure run.
    pub async fn record_success(&self) {
        let mut state = self.state.lock().await;
        state.failures = 0;
    }

    /// Record a failed call; opens the breaker at the threshold.
    pub async fn record_failure(&self) {
        let mut state = self.state.lock().await;
        state.failures += 1;
        state.last_failure = Some(Instant::now());
        if state.failures >= self.threshold && !state.open {
            state.open = true;
            tracing::error!(failures = state.failures, "circuit breaker opened due to repeated failures");
        }
    }

    /// Current state for health reporting.
    pub async fn status(&self) -> BreakerStatus {
        let state = self.state.lock().await;
        BreakerStatus { open: state.open, failures: state.failures }
    }
}
