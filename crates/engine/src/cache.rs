//! TTL-keyed memoization cache for quote snapshots.
//!
//! Every quote from IB costs a slow, rate-limited round trip; within one
//! polling pass the same contract is often needed several times (position
//! refresh, same-strike roll, delta scan). The cache absorbs those repeats.
//!
//! One mutex serializes every operation: at most one mutation in flight,
//! and every read observes a consistent `(snapshot, timestamp)` pair.
//! Expiry is lazy — checked on read — with an explicit sweep available.
//! The cache is an explicitly constructed instance owned by the caller and
//! passed by reference; there is no process-wide singleton.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::Serialize;

use roll_scout_core::{QuoteKey, QuoteSnapshot};

/// Default lifetime for cached option quotes.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);

/// Point-in-time cache statistics.
///
/// Counters accumulate for the lifetime of the cache instance and reset
/// only via [`QuoteCache::reset_stats`]. Expired reads count as misses, so
/// `hits + misses == total_requests` always holds.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    pub total_requests: u64,
    pub hits: u64,
    pub misses: u64,
    /// Reads that found an entry past its TTL. Also counted in `misses`.
    pub expired: u64,
    /// Live entries at snapshot time.
    pub size: usize,
}

impl CacheStats {
    /// Hit rate in percent; 0 when nothing has been requested yet.
    pub fn hit_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.hits as f64 / self.total_requests as f64 * 100.0
        }
    }
}

struct CacheEntry {
    snapshot: QuoteSnapshot,
    inserted_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    /// An entry is valid iff `now − inserted_at < ttl`.
    fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.inserted_at) >= self.ttl
    }
}

struct Inner {
    entries: HashMap<QuoteKey, CacheEntry>,
    stats: CacheStats,
}

/// Thread-safe TTL cache for quote/price snapshots.
///
/// TTL is per entry, so option quotes and underlying prices can coexist in
/// one store with different lifetimes.
pub struct QuoteCache {
    inner: Mutex<Inner>,
    default_ttl: Duration,
}

impl Default for QuoteCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl QuoteCache {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                stats: CacheStats::default(),
            }),
            default_ttl,
        }
    }

    /// Look up a snapshot, counting the request.
    ///
    /// An expired entry counts as a miss, increments `expired` exactly
    /// once, and is evicted — a stale snapshot is never returned.
    pub fn get(&self, key: &QuoteKey) -> Option<QuoteSnapshot> {
        self.get_at(key, Instant::now())
    }

    fn get_at(&self, key: &QuoteKey, now: Instant) -> Option<QuoteSnapshot> {
        let mut inner = self.inner.lock().expect("cache mutex poisoned");
        inner.stats.total_requests += 1;

        match inner.entries.get(key) {
            None => {
                inner.stats.misses += 1;
                None
            }
            Some(entry) if entry.is_expired(now) => {
                inner.entries.remove(key);
                inner.stats.expired += 1;
                inner.stats.misses += 1;
                None
            }
            Some(entry) => {
                let snapshot = entry.snapshot.clone();
                inner.stats.hits += 1;
                Some(snapshot)
            }
        }
    }

    /// Store a snapshot with the cache's default TTL.
    pub fn put(&self, key: QuoteKey, snapshot: QuoteSnapshot) {
        self.put_at(key, snapshot, self.default_ttl, Instant::now());
    }

    /// Store a snapshot with an explicit TTL.
    pub fn put_with_ttl(&self, key: QuoteKey, snapshot: QuoteSnapshot, ttl: Duration) {
        self.put_at(key, snapshot, ttl, Instant::now());
    }

    fn put_at(&self, key: QuoteKey, snapshot: QuoteSnapshot, ttl: Duration, now: Instant) {
        let mut inner = self.inner.lock().expect("cache mutex poisoned");
        inner.entries.insert(
            key,
            CacheEntry {
                snapshot,
                inserted_at: now,
                ttl,
            },
        );
    }

    /// Sweep expired entries, returning how many were removed.
    ///
    /// Swept entries do not touch the read counters — only lazy
    /// expiry-on-read counts toward `expired`.
    pub fn clear_expired(&self) -> usize {
        self.clear_expired_at(Instant::now())
    }

    fn clear_expired_at(&self, now: Instant) -> usize {
        let mut inner = self.inner.lock().expect("cache mutex poisoned");
        let before = inner.entries.len();
        inner.entries.retain(|_, entry| !entry.is_expired(now));
        before - inner.entries.len()
    }

    /// Drop all entries. Statistics are kept.
    pub fn clear(&self) {
        let mut inner = self.inner.lock().expect("cache mutex poisoned");
        inner.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock().expect("cache mutex poisoned");
        CacheStats {
            size: inner.entries.len(),
            ..inner.stats.clone()
        }
    }

    pub fn reset_stats(&self) {
        let mut inner = self.inner.lock().expect("cache mutex poisoned");
        inner.stats = CacheStats::default();
    }
}
