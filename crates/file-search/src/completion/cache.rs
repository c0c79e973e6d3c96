// crates/file-search/src/completion/cache.rs
// Time-bounded cache for completion listings

use moka::sync::Cache;
use std::time::Duration;

/// Lifetime used when the configured TTL is zero
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// String-keyed cache with a fixed time-to-live. Expired entries are
/// indistinguishable from absent ones.
pub struct TtlCache {
    entries: Cache<String, Vec<String>>,
    ttl: Duration,
}

impl TtlCache {
    pub fn new(ttl: Duration) -> Self {
        let ttl = if ttl.is_zero() { DEFAULT_TTL } else { ttl };
        Self {
            entries: Cache::builder().time_to_live(ttl).build(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Values for `key` if present and not yet expired
    pub fn get(&self, key: &str) -> Option<Vec<String>> {
        self.entries.get(key)
    }

    /// Overwrite `key` and restart its lifetime
    pub fn set(&self, key: impl Into<String>, values: Vec<String>) {
        self.entries.insert(key.into(), values);
    }

    pub fn clear(&self) {
        self.entries.invalidate_all();
    }
}
