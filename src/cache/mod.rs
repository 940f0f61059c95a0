//! Read-through TTL cache for computed breakdowns, owned and passed in by the caller.

use crate::error::Result;
use crate::model::DamageBreakdown;
use crate::util::lookup_key;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub build: String,
    pub level: u32,
    pub is_headshot: bool,
    pub is_weak_point: bool,
}

impl CacheKey {
    pub fn new(build: &str, level: u32, is_headshot: bool, is_weak_point: bool) -> Self {
        Self {
            build: lookup_key(build),
            level,
            is_headshot,
            is_weak_point,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64 * 100.0
        }
    }
}

#[derive(Debug)]
struct Entry {
    value: DamageBreakdown,
    expires_at: Instant,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<CacheKey, Entry>,
    hits: u64,
    misses: u64,
}

/// Entries are safe to drop at any time; a miss just recomputes.
#[derive(Debug)]
pub struct DamageCache {
    ttl: Duration,
    inner: Mutex<Inner>,
}

impl DamageCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached value for `key`, or compute, store and return it.
    /// Errors from `compute` are returned as-is and never cached.
    pub fn get_or_compute<F>(&self, key: CacheKey, compute: F) -> Result<DamageBreakdown>
    where
        F: FnOnce() -> Result<DamageBreakdown>,
    {
        self.get_or_compute_at(key, Instant::now(), compute)
    }

    pub(crate) fn get_or_compute_at<F>(
        &self,
        key: CacheKey,
        now: Instant,
        compute: F,
    ) -> Result<DamageBreakdown>
    where
        F: FnOnce() -> Result<DamageBreakdown>,
    {
        {
            let mut inner = self.lock();
            match inner.entries.get(&key) {
                Some(e) if now < e.expires_at => {
                    let value = e.value.clone();
                    inner.hits += 1;
                    return Ok(value);
                }
                Some(_) => {
                    tracing::debug!(build = %key.build, level = key.level, "cache entry expired");
                    inner.entries.remove(&key);
                }
                None => {}
            }
            inner.misses += 1;
        }
        // Computed outside the lock; a concurrent miss on the same key just computes twice.
        let value = compute()?;
        self.lock().entries.insert(
            key,
            Entry {
                value: value.clone(),
                expires_at: now + self.ttl,
            },
        );
        Ok(value)
    }

    pub fn clear(&self) {
        self.lock().entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.lock();
        CacheStats {
            hits: inner.hits,
            misses: inner.misses,
            entries: inner.entries.len(),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A panic while holding the lock cannot leave an entry half-written.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
