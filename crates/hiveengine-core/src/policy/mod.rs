//! Reliability policies applied per node.
//!
//! A single-node transport applies them in this order:
//! ```text
//! Request → [RateLimiter] → [CircuitBreaker] → [RetryPolicy] → HTTP
//! ```
//! The node pool reuses [`CircuitBreaker`] to decide which nodes to try.

pub mod circuit_breaker;
pub mod rate_limiter;
pub mod retry;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use rate_limiter::{RateLimiter, RateLimiterConfig};
pub use retry::{RetryConfig, RetryPolicy};
