//! Circuit breaker for backend protection.
//!
//! # States
//! - Closed: normal operation, requests pass through
//! - Open: backend assumed down, requests fail fast to the fallback
//! - Half-Open: testing if backend recovered
//!
//! # State Transitions
//! ```text
//! Closed -> Open: consecutive failures reach threshold
//! Open -> Half-Open: after cool-down, next request becomes the probe
//! Half-Open -> Closed: probe request succeeds
//! Half-Open -> Open: probe request fails (cool-down restarts)
//! ```
//!
//! # Design Decisions
//! - One breaker per route, never shared across routes
//! - Fail fast in Open state: no outbound connection is attempted
//! - Bounded concurrent probes in Half-Open (prevents hammering a
//!   recovering backend)
//! - All mutation happens under a single per-breaker mutex, held only for
//!   counter arithmetic and never across an await point
//! - Outcomes are recorded through a consuming permit, so each attempted
//!   call is counted exactly once; an abandoned permit releases its
//!   half-open slot without a state transition

use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

use crate::config::schema::BreakerConfig;
use crate::observability::metrics;

/// Breaker state as seen by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

impl BreakerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            BreakerState::Closed => "closed",
            BreakerState::Open => "open",
            BreakerState::HalfOpen => "half-open",
        }
    }
}

#[derive(Debug)]
struct Inner {
    state: BreakerState,
    consecutive_failures: u32,
    probes_in_flight: u32,
    last_transition: Instant,
}

/// Per-route failure-tracking state machine.
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    failure_threshold: u32,
    cool_down: Duration,
    half_open_trials: u32,
    trip_statuses: Vec<u16>,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, config: &BreakerConfig) -> Self {
        Self {
            name: name.into(),
            failure_threshold: config.failure_threshold,
            cool_down: Duration::from_secs(config.cool_down_secs),
            half_open_trials: config.half_open_trials,
            trip_statuses: config.trip_statuses.clone(),
            inner: Mutex::new(Inner {
                state: BreakerState::Closed,
                consecutive_failures: 0,
                probes_in_flight: 0,
                last_transition: Instant::now(),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ask the breaker whether a backend call may be attempted.
    ///
    /// `None` means the circuit is open and the caller must serve the
    /// fallback without any outbound connection. While open, the first
    /// request after the cool-down flips the breaker to half-open and is
    /// admitted as the probe.
    pub fn try_acquire(&self) -> Option<Permit<'_>> {
        let mut inner = self.lock();
        match inner.state {
            BreakerState::Closed => Some(Permit::new(self, false)),
            BreakerState::Open => {
                if inner.last_transition.elapsed() >= self.cool_down {
                    self.transition(&mut inner, BreakerState::HalfOpen);
                    inner.probes_in_flight = 1;
                    Some(Permit::new(self, true))
                } else {
                    None
                }
            }
            BreakerState::HalfOpen => {
                if inner.probes_in_flight < self.half_open_trials {
                    inner.probes_in_flight += 1;
                    Some(Permit::new(self, true))
                } else {
                    None
                }
            }
        }
    }

    /// Whether a backend status code is recorded as a breaker failure.
    pub fn trips_on(&self, status: u16) -> bool {
        self.trip_statuses.contains(&status)
    }

    /// Current state (for diagnostics and tests).
    pub fn state(&self) -> BreakerState {
        self.lock().state
    }

    /// Current consecutive-failure count (for diagnostics and tests).
    pub fn consecutive_failures(&self) -> u32 {
        self.lock().consecutive_failures
    }

    fn record_success(&self) {
        let mut inner = self.lock();
        match inner.state {
            BreakerState::Closed => inner.consecutive_failures = 0,
            BreakerState::HalfOpen => {
                inner.consecutive_failures = 0;
                inner.probes_in_flight = 0;
                self.transition(&mut inner, BreakerState::Closed);
            }
            // A late result: a concurrent outcome already moved the
            // breaker on. The cool-down in force stays authoritative.
            BreakerState::Open => {}
        }
    }

    fn record_failure(&self) {
        let mut inner = self.lock();
        match inner.state {
            BreakerState::Closed => {
                inner.consecutive_failures += 1;
                if inner.consecutive_failures >= self.failure_threshold {
                    self.transition(&mut inner, BreakerState::Open);
                }
            }
            BreakerState::HalfOpen => {
                inner.probes_in_flight = 0;
                self.transition(&mut inner, BreakerState::Open);
            }
            BreakerState::Open => {}
        }
    }

    fn release_abandoned(&self, probe: bool) {
        if !probe {
            return;
        }
        let mut inner = self.lock();
        if inner.state == BreakerState::HalfOpen {
            inner.probes_in_flight = inner.probes_in_flight.saturating_sub(1);
        }
    }

    fn transition(&self, inner: &mut Inner, next: BreakerState) {
        let previous = inner.state;
        inner.state = next;
        inner.last_transition = Instant::now();
        match next {
            BreakerState::Open => tracing::warn!(
                breaker = %self.name,
                from = previous.as_str(),
                failures = inner.consecutive_failures,
                "circuit opened"
            ),
            BreakerState::HalfOpen => tracing::info!(
                breaker = %self.name,
                "circuit half-open, admitting probe"
            ),
            BreakerState::Closed => tracing::info!(
                breaker = %self.name,
                "circuit closed"
            ),
        }
        metrics::record_breaker_transition(&self.name, next.as_str());
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("breaker mutex poisoned")
    }
}

/// Permission for exactly one backend attempt.
///
/// Consumed by `success` or `failure`; dropping it unresolved (the call
/// was never issued or its outcome never observed) releases any half-open
/// trial slot it held.
#[must_use = "a permit must record the call outcome"]
#[derive(Debug)]
pub struct Permit<'a> {
    breaker: &'a CircuitBreaker,
    probe: bool,
    resolved: bool,
}

impl<'a> Permit<'a> {
    fn new(breaker: &'a CircuitBreaker, probe: bool) -> Self {
        Self {
            breaker,
            probe,
            resolved: false,
        }
    }

    /// Record the attempt as a success.
    pub fn success(mut self) {
        self.resolved = true;
        self.breaker.record_success();
    }

    /// Record the attempt as a failure.
    pub fn failure(mut self) {
        self.resolved = true;
        self.breaker.record_failure();
    }
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        if !self.resolved {
            self.breaker.release_abandoned(self.probe);
        }
    }
}
