//! Circuit breaker state machine (§4.2).
//!
//! CLOSED/OPEN/HALF_OPEN transitions are driven entirely by `Ordering`-
//! annotated atomics so a breaker can be checked and updated from many
//! concurrent callers without a lock — just counts and a single timestamp,
//! no history buffer.

// Layer 1: Standard library imports
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU32, AtomicU8, Ordering};

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use crate::clock::SharedClock;

const CLOSED: u8 = 0;
const OPEN: u8 = 1;
const HALF_OPEN: u8 = 2;

/// Observable circuit state (§4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl CircuitState {
    fn from_tag(tag: u8) -> Self {
        match tag {
            OPEN => Self::Open,
            HALF_OPEN => Self::HalfOpen,
            _ => Self::Closed,
        }
    }

    fn tag(self) -> u8 {
        match self {
            Self::Closed => CLOSED,
            Self::Open => OPEN,
            Self::HalfOpen => HALF_OPEN,
        }
    }
}

/// Lock-free circuit breaker guarding calls to a flaky dependency (an agent
/// handler, in this runtime).
///
/// `failure_threshold` consecutive failures in CLOSED trip the breaker to
/// OPEN. After `open_timeout_ms`, the next caller to observe OPEN flips the
/// breaker to HALF_OPEN and becomes the sole admitted probe; concurrent
/// callers racing the same transition lose the compare-and-swap and are
/// refused. `success_threshold` consecutive probe successes close the
/// breaker again; a single probe failure reopens it.
pub struct CircuitBreaker {
    state: AtomicU8,
    failure_count: AtomicU32,
    success_count: AtomicU32,
    opened_at_ms: AtomicI64,
    probe_in_flight: AtomicBool,
    failure_threshold: u32,
    success_threshold: u32,
    open_timeout_ms: i64,
    clock: SharedClock,
}

impl CircuitBreaker {
    pub fn new(
        failure_threshold: u32,
        success_threshold: u32,
        open_timeout_ms: i64,
        clock: SharedClock,
    ) -> Self {
        Self {
            state: AtomicU8::new(CLOSED),
            failure_count: AtomicU32::new(0),
            success_count: AtomicU32::new(0),
            opened_at_ms: AtomicI64::new(0),
            probe_in_flight: AtomicBool::new(false),
            failure_threshold: failure_threshold.max(1),
            success_threshold: success_threshold.max(1),
            open_timeout_ms,
            clock,
        }
    }

    /// Current state without attempting any transition.
    pub fn state(&self) -> CircuitState {
        CircuitState::from_tag(self.state.load(Ordering::Acquire))
    }

    /// Whether a call should be let through right now.
    ///
    /// In OPEN, this is also where the OPEN -> HALF_OPEN transition happens
    /// once `open_timeout_ms` has elapsed; exactly one caller per transition
    /// wins the race and is admitted as the HALF_OPEN probe.
    pub fn allow_request(&self) -> bool {
        match self.state() {
            CircuitState::Closed => true,
            CircuitState::Open => {
                let elapsed = self.clock.now_ms() - self.opened_at_ms.load(Ordering::Acquire);
                if elapsed < self.open_timeout_ms {
                    return false;
                }
                if self
                    .state
                    .compare_exchange(
                        OPEN,
                        HALF_OPEN,
                        Ordering::AcqRel,
                        Ordering::Acquire,
                    )
                    .is_ok()
                {
                    self.success_count.store(0, Ordering::Release);
                    self.probe_in_flight.store(true, Ordering::Release);
                    true
                } else {
                    false
                }
            }
            CircuitState::HalfOpen => self
                .probe_in_flight
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_ok(),
        }
    }

    /// Record a successful call.
    pub fn record_success(&self) {
        match self.state() {
            CircuitState::Closed => {
                self.failure_count.store(0, Ordering::Release);
            }
            CircuitState::HalfOpen => {
                let successes = self.success_count.fetch_add(1, Ordering::AcqRel) + 1;
                self.probe_in_flight.store(false, Ordering::Release);
                if successes >= self.success_threshold {
                    self.close();
                }
            }
            CircuitState::Open => {}
        }
    }

    /// Record a failed call.
    pub fn record_failure(&self) {
        match self.state() {
            CircuitState::Closed => {
                let failures = self.failure_count.fetch_add(1, Ordering::AcqRel) + 1;
                if failures >= self.failure_threshold {
                    self.open();
                }
            }
            CircuitState::HalfOpen => {
                self.probe_in_flight.store(false, Ordering::Release);
                self.open();
            }
            CircuitState::Open => {}
        }
    }

    fn open(&self) {
        self.opened_at_ms.store(self.clock.now_ms(), Ordering::Release);
        self.failure_count.store(0, Ordering::Release);
        self.state.store(OPEN, Ordering::Release);
    }

    fn close(&self) {
        self.failure_count.store(0, Ordering::Release);
        self.success_count.store(0, Ordering::Release);
        self.state.store(CLOSED, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::fake::FakeClock;
    use std::sync::Arc;

    fn breaker(clock: Arc<FakeClock>) -> CircuitBreaker {
        CircuitBreaker::new(3, 2, 1_000, clock)
    }

    #[test]
    fn trips_open_after_threshold_failures() {
        let clock = Arc::new(FakeClock::new(0));
        let cb = breaker(clock);
        for _ in 0..3 {
            assert!(cb.allow_request());
            cb.record_failure();
        }
        assert_eq!(cb.state(), CircuitState::Open);
        assert!(!cb.allow_request());
    }

    #[test]
    fn transitions_to_half_open_after_timeout() {
        let clock = Arc::new(FakeClock::new(0));
        let cb = breaker(Arc::clone(&clock));
        for _ in 0..3 {
            cb.record_failure();
        }
        assert_eq!(cb.state(), CircuitState::Open);
        clock.advance(1_001);
        assert!(cb.allow_request());
        assert_eq!(cb.state(), CircuitState::HalfOpen);
    }

    #[test]
    fn closes_after_success_threshold_in_half_open() {
        let clock = Arc::new(FakeClock::new(0));
        let cb = breaker(Arc::clone(&clock));
        for _ in 0..3 {
            cb.record_failure();
        }
        clock.advance(1_001);
        assert!(cb.allow_request());
        cb.record_success();
        assert!(cb.allow_request());
        cb.record_success();
        assert_eq!(cb.state(), CircuitState::Closed);
    }

    #[test]
    fn single_failure_in_half_open_reopens() {
        let clock = Arc::new(FakeClock::new(0));
        let cb = breaker(Arc::clone(&clock));
        for _ in 0..3 {
            cb.record_failure();
        }
        clock.advance(1_001);
        assert!(cb.allow_request());
        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Open);
    }

    #[test]
    fn only_one_probe_admitted_per_half_open_window() {
        let clock = Arc::new(FakeClock::new(0));
        let cb = breaker(Arc::clone(&clock));
        for _ in 0..3 {
            cb.record_failure();
        }
        clock.advance(1_001);
        assert!(cb.allow_request());
        assert!(!cb.allow_request());
    }
}
