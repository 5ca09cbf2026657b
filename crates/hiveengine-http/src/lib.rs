//! hiveengine-http: HTTP transports for Hive Engine.
//!
//! - [`HttpRpcClient`]: JSON-RPC over HTTP to one node, with rate limiting,
//!   a circuit breaker and retry with backoff.
//! - [`HistoryClient`]: the account history REST service.

pub mod client;
pub mod history;

pub use client::{HttpClientConfig, HttpRpcClient};
pub use history::{HistoryClient, HistoryQuery, DEFAULT_HISTORY_URL};

/// Append a trailing slash so endpoint paths join cleanly.
pub fn normalize_base_url(url: &str) -> String {
    format!("{}/", url.trim().trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gets_single_trailing_slash() {
        assert_eq!(normalize_base_url("https://a.com/rpc"), "https://a.com/rpc/");
        assert_eq!(normalize_base_url(" https://a.com/rpc// "), "https://a.com/rpc/");
    }
}
