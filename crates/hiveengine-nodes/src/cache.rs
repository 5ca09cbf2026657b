//! On-disk cache for Beacon payloads.
//!
//! One JSON file per Beacon URL, named after the SHA-256 of the URL, valid
//! for `ttl` from its modification time. Every failure here is logged and
//! treated as a miss.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use serde_json::Value;
use sha2::{Digest, Sha256};

/// How long a cached Beacon payload stays fresh.
pub const CACHE_DURATION: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone)]
pub struct NodeCache {
    dir: PathBuf,
    ttl: Duration,
}

impl Default for NodeCache {
    fn default() -> Self {
        Self::new(std::env::temp_dir(), CACHE_DURATION)
    }
}

impl NodeCache {
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            dir: dir.into(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cache file for `url`.
    pub fn path_for(&self, url: &str) -> PathBuf {
        let digest = Sha256::digest(url.as_bytes());
        self.dir
            .join(format!("hiveengine_cache_{}.json", hex::encode(digest)))
    }

    /// Cached payload for `url` if present and fresh.
    pub fn load(&self, url: &str) -> Option<Value> {
        let path = self.path_for(url);
        if !self.is_fresh(&path) {
            return None;
        }
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "node cache unreadable");
                return None;
            }
        };
        match serde_json::from_str(&content) {
            Ok(v) => {
                tracing::debug!(url, "node list served from cache");
                Some(v)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "corrupt node cache ignored");
                None
            }
        }
    }

    pub fn store(&self, url: &str, payload: &Value) {
        let path = self.path_for(url);
        let result = serde_json::to_vec(payload)
            .map_err(std::io::Error::from)
            .and_then(|bytes| fs::write(&path, bytes));
        if let Err(e) = result {
            tracing::warn!(path = %path.display(), error = %e, "failed to write node cache");
        }
    }

    pub fn invalidate(&self, url: &str) {
        let path = self.path_for(url);
        if path.exists() {
            if let Err(e) = fs::remove_file(&path) {
                tracing::warn!(path = %path.display(), error = %e, "failed to remove node cache");
            }
        }
    }

    fn is_fresh(&self, path: &Path) -> bool {
        let modified = match fs::metadata(path).and_then(|m| m.modified()) {
            Ok(m) => m,
            Err(_) => return false,
        };
        SystemTime::now()
            .duration_since(modified)
            .map(|age| age < self.ttl)
            // mtime in the future: treat as fresh
            .unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn store_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let cache = NodeCache::new(dir.path(), Duration::from_secs(60));
        let payload = json!([{"endpoint": "https://a"}]);

        assert!(cache.load("https://beacon/nodes").is_none());
        cache.store("https://beacon/nodes", &payload);
        assert_eq!(cache.load("https://beacon/nodes"), Some(payload));
    }

    #[test]
    fn urls_get_distinct_files() {
        let cache = NodeCache::default();
        let a = cache.path_for("https://beacon.peakd.com/api/he/nodes");
        let b = cache.path_for("https://beacon.peakd.com/api/heh/nodes");
        assert_ne!(a, b);
        let name = a.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("hiveengine_cache_") && name.ends_with(".json"));
    }

    #[test]
    fn expired_entry_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = NodeCache::new(dir.path(), CACHE_DURATION);
        cache.store("u", &json!([]));
        assert!(cache.load("u").is_some());

        let stale = SystemTime::now() - (CACHE_DURATION + Duration::from_secs(10));
        fs::File::options()
            .write(true)
            .open(cache.path_for("u"))
            .unwrap()
            .set_modified(stale)
            .unwrap();
        assert!(cache.load("u").is_none());
    }

    #[test]
    fn corrupt_entry_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let cache = NodeCache::new(dir.path(), Duration::from_secs(60));
        fs::write(cache.path_for("u"), b"{not json").unwrap();
        assert!(cache.load("u").is_none());
    }

    #[test]
    fn invalidate_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let cache = NodeCache::new(dir.path(), Duration::from_secs(60));
        cache.store("u", &json!([]));
        cache.invalidate("u");
        assert!(!cache.path_for("u").exists());
    }
}
