//! Exponential backoff retry policy with bounded jitter.

use std::time::Duration;

/// Configuration for the retry policy.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retries (the first attempt is not counted).
    pub max_retries: u32,
    pub initial_backoff: Duration,
    /// Cap on the exponential growth, applied before jitter.
    pub max_backoff: Duration,
    pub multiplier: f64,
    /// Up to `jitter_fraction * backoff` extra delay (0.0 = deterministic).
    pub jitter_fraction: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff: Duration::from_millis(250),
            max_backoff: Duration::from_secs(5),
            multiplier: 2.0,
            jitter_fraction: 0.1,
        }
    }
}

impl RetryConfig {
    /// A config that never retries; failover is left to the node pool.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }
}

/// Stateless retry policy: computes the delay before a given retry.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub config: RetryConfig,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Returns the delay before the `attempt`-th retry (1-based), or `None`
    /// once `max_retries` is exhausted.
    pub fn next_delay(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt > self.config.max_retries {
            return None;
        }
        let base = self.backoff(attempt);
        let unit: f64 = rand::random();
        let jitter = base.mul_f64(self.config.jitter_fraction.clamp(0.0, 1.0) * unit);
        Some(base + jitter)
    }

    /// Backoff without jitter: `initial * multiplier^(attempt-1)`, capped.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let factor = self.config.multiplier.max(1.0).powi(exp);
        let secs = self.config.initial_backoff.as_secs_f64() * factor;
        let capped = secs.min(self.config.max_backoff.as_secs_f64());
        Duration::from_secs_f64(capped)
    }

    /// Returns `true` if another retry is allowed after `attempt` failures.
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt <= self.config.max_retries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(max_retries: u32, max_backoff: Duration) -> RetryPolicy {
        RetryPolicy::new(RetryConfig {
            max_retries,
            initial_backoff: Duration::from_millis(100),
            max_backoff,
            multiplier: 2.0,
            jitter_fraction: 0.0,
        })
    }

    #[test]
    fn delays_double() {
        let p = policy(3, Duration::from_secs(30));
        assert_eq!(p.next_delay(1).unwrap().as_millis(), 100);
        assert_eq!(p.next_delay(2).unwrap().as_millis(), 200);
        assert_eq!(p.next_delay(3).unwrap().as_millis(), 400);
        assert!(p.next_delay(4).is_none());
        assert!(p.next_delay(0).is_none());
    }

    #[test]
    fn delay_capped_at_max() {
        let p = policy(10, Duration::from_millis(500));
        assert_eq!(p.next_delay(8).unwrap(), Duration::from_millis(500));
    }

    #[test]
    fn jitter_stays_within_fraction() {
        let p = RetryPolicy::new(RetryConfig {
            max_retries: 1,
            initial_backoff: Duration::from_millis(1000),
            max_backoff: Duration::from_secs(10),
            multiplier: 2.0,
            jitter_fraction: 0.2,
        });
        let delays: Vec<_> = (0..32).map(|_| p.next_delay(1).unwrap()).collect();
        for d in &delays {
            assert!(*d >= Duration::from_millis(1000) && *d <= Duration::from_millis(1200), "{d:?}");
        }
        assert!(delays.iter().any(|d| *d > Duration::from_millis(1000)), "jitter never applied");
    }

    #[test]
    fn no_retry_config() {
        let p = RetryPolicy::new(RetryConfig::no_retry());
        assert!(!p.should_retry(1));
        assert!(p.next_delay(1).is_none());
    }
}
