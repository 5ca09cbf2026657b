//! Token bucket rate limiter.
//!
//! Public Hive Engine nodes throttle aggressive clients, and `find_all` over a
//! large table can issue hundreds of requests back to back. Tokens accrue at
//! `refill_rate` per second up to `capacity`; each request takes one.

use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Burst size.
    pub capacity: f64,
    /// Requests per second once the burst is spent.
    pub refill_rate: f64,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            capacity: 20.0,
            refill_rate: 10.0,
        }
    }
}

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    bucket: Mutex<Bucket>,
}

impl RateLimiter {
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            bucket: Mutex::new(Bucket {
                tokens: config.capacity,
                last_refill: Instant::now(),
            }),
            config,
        }
    }

    /// Take one token if available.
    pub fn try_acquire(&self) -> bool {
        let mut bucket = self.bucket.lock().unwrap_or_else(|p| p.into_inner());
        self.refill(&mut bucket);
        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Time until one token is available.
    pub fn wait_time(&self) -> Duration {
        let mut bucket = self.bucket.lock().unwrap_or_else(|p| p.into_inner());
        self.refill(&mut bucket);
        let deficit = 1.0 - bucket.tokens;
        if deficit <= 0.0 || self.config.refill_rate <= 0.0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(deficit / self.config.refill_rate)
        }
    }

    /// Wait until a token is available, then take it.
    pub async fn acquire(&self) {
        while !self.try_acquire() {
            let wait = self.wait_time().max(Duration::from_millis(1));
            tracing::debug!(wait_ms = wait.as_millis() as u64, "rate limited, waiting");
            tokio::time::sleep(wait).await;
        }
    }

    fn refill(&self, bucket: &mut Bucket) {
        let now = Instant::now();
        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.config.refill_rate).min(self.config.capacity);
        bucket.last_refill = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_within_capacity() {
        let rl = RateLimiter::new(RateLimiterConfig {
            capacity: 5.0,
            refill_rate: 1.0,
        });
        for _ in 0..5 {
            assert!(rl.try_acquire());
        }
    }

    #[test]
    fn rejects_when_empty() {
        let rl = RateLimiter::new(RateLimiterConfig {
            capacity: 2.0,
            refill_rate: 0.0001,
        });
        assert!(rl.try_acquire());
        assert!(rl.try_acquire());
        assert!(!rl.try_acquire());
        assert!(rl.wait_time() > Duration::from_secs(60));
    }

    #[tokio::test]
    async fn acquire_waits_for_refill() {
        let rl = RateLimiter::new(RateLimiterConfig {
            capacity: 1.0,
            refill_rate: 50.0,
        });
        rl.acquire().await;
        let start = Instant::now();
        rl.acquire().await;
        assert!(start.elapsed() >= Duration::from_millis(10));
    }
}
