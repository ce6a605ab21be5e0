use std::time::{Duration, Instant};

use moka::Expiry;

use crate::error::CacheError;

/// Default lifetime of a cached range: 30 days.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(2_592_000);

/// Key/value store for range bodies.
///
/// Implementations must tolerate concurrent use. Errors are never fatal to a
/// check: a failed read counts as a miss and a failed write is logged.
pub trait Cache: Send + Sync {
    /// Returns `Ok(None)` on a miss or an expired entry.
    fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Stores `value` under `key` for `ttl`.
    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;
}

/// A cache that never holds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCache;

impl Cache for NoCache {
    fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), CacheError> {
        Ok(())
    }
}

#[derive(Clone)]
struct Entry {
    value: String,
    ttl: Duration,
}

struct EntryExpiry;

impl Expiry<String, Entry> for EntryExpiry {
    fn expire_after_create(&self, _key: &String, entry: &Entry, _now: Instant) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &Entry,
        _now: Instant,
        _current: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// Bounded in-process cache with per-entry expiry.
#[derive(Clone)]
pub struct MemoryCache {
    inner: moka::sync::Cache<String, Entry>,
}

impl MemoryCache {
    /// Default capacity in entries. A range body is roughly 30-40 KB.
    pub const DEFAULT_CAPACITY: u64 = 1024;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    pub fn with_capacity(max_entries: u64) -> Self {
        let inner = moka::sync::Cache::builder()
            .max_capacity(max_entries)
            .expire_after(EntryExpiry)
            .build();
        Self { inner }
    }

    pub fn entry_count(&self) -> u64 {
        self.inner.run_pending_tasks();
        self.inner.entry_count()
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl Cache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.inner.get(key).map(|entry| entry.value))
    }

    fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        self.inner.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                ttl,
            },
        );
        Ok(())
    }
}
