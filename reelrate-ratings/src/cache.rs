//! Aggregate rating cache
//!
//! Fixed TTL chosen at construction, uniform for every entry. Expiry is lazy:
//! an expired entry reads as absent and is dropped on that read. Every
//! [`SWEEP_EVERY_WRITES`] writes also sweep out expired entries, so keys that
//! are never read again do not accumulate. Writes for an existing key replace
//! the prior entry.

use crate::types::AggregateRating;
use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Writes between expired-entry sweeps
pub const SWEEP_EVERY_WRITES: usize = 64;

/// Cache contract used by the aggregator
pub trait RatingCache: Send + Sync {
    fn get(&self, key: &str) -> Option<AggregateRating>;

    fn set(&self, key: String, value: AggregateRating);

    /// Entries currently held, expired ones included until swept or read
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: AggregateRating,
    expires_at: Instant,
}

/// In-process TTL cache over a sharded concurrent map
#[derive(Debug)]
pub struct TtlCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
    writes: AtomicUsize,
}

impl TtlCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            writes: AtomicUsize::new(0),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Drop every expired entry; returns how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.expires_at > now);
        before.saturating_sub(self.entries.len())
    }
}

impl RatingCache for TtlCache {
    fn get(&self, key: &str) -> Option<AggregateRating> {
        let now = Instant::now();
        // Guard must drop before remove() on the same shard
        let hit = self.entries.get(key).map(|entry| {
            if entry.expires_at > now {
                Some(entry.value.clone())
            } else {
                None
            }
        })?;

        if hit.is_none() {
            self.entries.remove_if(key, |_, entry| entry.expires_at <= now);
        }
        hit
    }

    fn set(&self, key: String, value: AggregateRating) {
        let expires_at = Instant::now() + self.ttl;
        self.entries.insert(key, CacheEntry { value, expires_at });

        let written = self.writes.fetch_add(1, Ordering::Relaxed) + 1;
        if written % SWEEP_EVERY_WRITES == 0 {
            let purged = self.purge_expired();
            if purged > 0 {
                debug!(purged, remaining = self.entries.len(), "Swept expired cache entries");
            }
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Cache key for one movie's aggregate
pub fn movie_key(movie_id: u64) -> String {
    format!("movie_id:{}", movie_id)
}
