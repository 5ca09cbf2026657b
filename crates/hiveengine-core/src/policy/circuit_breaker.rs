//! Per-node circuit breaker: Closed → Open → Half-Open.
//!
//! - `Closed` → `Open`: `failure_threshold` consecutive failures
//! - `Open` → `HalfOpen`: `open_duration` has elapsed
//! - `HalfOpen` → `Closed`: `success_threshold` probes succeed
//! - `HalfOpen` → `Open`: a probe fails

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed => write!(f, "closed"),
            Self::Open => write!(f, "open"),
            Self::HalfOpen => write!(f, "half-open"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures before the node is taken out of rotation.
    pub failure_threshold: u32,
    /// How long a node stays out of rotation before a probe is allowed.
    pub open_duration: Duration,
    /// Successful probes needed to close again.
    pub success_threshold: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            open_duration: Duration::from_secs(60),
            success_threshold: 1,
        }
    }
}

#[derive(Debug)]
struct CircuitInner {
    state: CircuitState,
    failure_count: u32,
    success_count: u32,
    opened_at: Option<Instant>,
}

/// Thread-safe circuit breaker labelled with the node it guards.
#[derive(Clone)]
pub struct CircuitBreaker {
    label: Arc<str>,
    config: CircuitBreakerConfig,
    inner: Arc<Mutex<CircuitInner>>,
}

impl CircuitBreaker {
    pub fn new(label: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            label: Arc::from(label.into()),
            config,
            inner: Arc::new(Mutex::new(CircuitInner {
                state: CircuitState::Closed,
                failure_count: 0,
                success_count: 0,
                opened_at: None,
            })),
        }
    }

    // A panic while holding the lock leaves only counters behind; keep using them.
    fn lock(&self) -> MutexGuard<'_, CircuitInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Current state, moving Open → HalfOpen once the wait has elapsed.
    pub fn state(&self) -> CircuitState {
        let mut inner = self.lock();
        if inner.state == CircuitState::Open {
            let elapsed = inner
                .opened_at
                .map(|at| at.elapsed() >= self.config.open_duration)
                .unwrap_or(true);
            if elapsed {
                inner.state = CircuitState::HalfOpen;
                inner.success_count = 0;
                tracing::info!(node = %self.label, "circuit half-open, probing node");
            }
        }
        inner.state
    }

    pub fn is_allowed(&self) -> bool {
        self.state() != CircuitState::Open
    }

    pub fn failure_count(&self) -> u32 {
        self.lock().failure_count
    }

    pub fn record_success(&self) {
        let mut inner = self.lock();
        match inner.state {
            CircuitState::HalfOpen => {
                inner.success_count += 1;
                if inner.success_count >= self.config.success_threshold {
                    inner.state = CircuitState::Closed;
                    inner.failure_count = 0;
                    inner.success_count = 0;
                    inner.opened_at = None;
                    tracing::info!(node = %self.label, "circuit closed");
                }
            }
            CircuitState::Closed => inner.failure_count = 0,
            CircuitState::Open => {}
        }
    }

    pub fn record_failure(&self) {
        let mut inner = self.lock();
        match inner.state {
            CircuitState::Closed => {
                inner.failure_count += 1;
                if inner.failure_count >= self.config.failure_threshold {
                    inner.state = CircuitState::Open;
                    inner.opened_at = Some(Instant::now());
                    tracing::warn!(
                        node = %self.label,
                        failures = inner.failure_count,
                        "circuit open, node taken out of rotation"
                    );
                }
            }
            CircuitState::HalfOpen => {
                inner.state = CircuitState::Open;
                inner.opened_at = Some(Instant::now());
                inner.success_count = 0;
                tracing::warn!(node = %self.label, "probe failed, circuit open again");
            }
            CircuitState::Open => {}
        }
    }
}

impl std::fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("node", &self.label)
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cb(threshold: u32, open_for: Duration) -> CircuitBreaker {
        CircuitBreaker::new(
            "https://node.test/",
            CircuitBreakerConfig {
                failure_threshold: threshold,
                open_duration: open_for,
                success_threshold: 1,
            },
        )
    }

    #[test]
    fn starts_closed() {
        let c = cb(3, Duration::from_secs(60));
        assert_eq!(c.state(), CircuitState::Closed);
        assert!(c.is_allowed());
    }

    #[test]
    fn opens_after_threshold_failures() {
        let c = cb(2, Duration::from_secs(60));
        c.record_failure();
        assert!(c.is_allowed());
        c.record_failure();
        assert_eq!(c.state(), CircuitState::Open);
        assert!(!c.is_allowed());
    }

    #[test]
    fn success_resets_failure_count() {
        let c = cb(3, Duration::from_secs(60));
        c.record_failure();
        c.record_failure();
        c.record_success();
        assert_eq!(c.failure_count(), 0);
        c.record_failure();
        assert_eq!(c.state(), CircuitState::Closed);
    }

    #[test]
    fn zero_wait_goes_half_open_then_closes() {
        let c = cb(1, Duration::ZERO);
        c.record_failure();
        assert_eq!(c.state(), CircuitState::HalfOpen);
        c.record_success();
        assert_eq!(c.state(), CircuitState::Closed);
    }

    #[test]
    fn failed_probe_reopens() {
        let c = cb(1, Duration::ZERO);
        c.record_failure();
        assert_eq!(c.state(), CircuitState::HalfOpen);
        c.record_failure();
        let inner = c.lock();
        assert_eq!(inner.state, CircuitState::Open);
    }
}
