//! Cache Store Module
//!
//! The orchestrator in front of both tiers: memory → disk → miss lookups,
//! write-through puts, promotion and invalidation.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Duration;
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::cache::{CacheEntry, CacheKey, CacheStats, Clock, DiskTier, MemoryTier, SystemClock};
use crate::codec;
use crate::config::Config;
use crate::error::Result;

// == Cache Settings ==
/// Parameters a `ContentCache` is built from.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheSettings {
    /// Byte budget of the memory tier
    pub memory_budget_bytes: usize,
    /// Advisory only; reported in diagnostics, never enforced
    pub disk_budget_bytes: u64,
    /// TTL applied to both tiers, measured from write time
    pub ttl_seconds: u64,
    /// Directory owned by the disk tier
    pub directory: PathBuf,
}

impl CacheSettings {
    pub fn ttl(&self) -> Duration {
        let secs = i64::try_from(self.ttl_seconds).unwrap_or(i64::MAX);
        Duration::seconds(secs.min(i64::MAX / 1000))
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Config::default().cache_settings()
    }
}

/// Tier that answered a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Memory,
    Disk,
}

/// A successful lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheHit {
    pub payload: Vec<u8>,
    pub tier: Tier,
}

/// Memory tier and counters share one lock.
#[derive(Debug)]
struct Inner {
    memory: MemoryTier,
    stats: CacheStats,
}

// == Content Cache ==
/// Two-tier content cache.
///
/// Build one at startup and share it as `Arc<ContentCache>`. Callers only
/// ever observe a hit or a miss: tier failures are logged and degrade to a
/// miss (reads) or a memory-only write (puts).
pub struct ContentCache {
    settings: CacheSettings,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    inner: Mutex<Inner>,
    disk: DiskTier,
}

impl ContentCache {
    // == Constructor ==
    pub fn new(settings: CacheSettings, clock: Arc<dyn Clock>) -> Self {
        let ttl = settings.ttl();
        let disk = DiskTier::new(settings.directory.clone(), ttl, Arc::clone(&clock));
        Self {
            inner: Mutex::new(Inner {
                memory: MemoryTier::new(settings.memory_budget_bytes),
                stats: CacheStats::new(),
            }),
            settings,
            ttl,
            clock,
            disk,
        }
    }

    /// Uses the wall clock.
    pub fn from_settings(settings: CacheSettings) -> Self {
        Self::new(settings, Arc::new(SystemClock))
    }

    pub fn settings(&self) -> &CacheSettings {
        &self.settings
    }

    pub fn disk(&self) -> &DiskTier {
        &self.disk
    }

    // == Lookup ==
    /// Memory → disk → miss.
    ///
    /// A stale memory entry is evicted before falling through. A disk hit is
    /// promoted into memory with its original write time, so promotion never
    /// extends an entry's life.
    pub async fn lookup(&self, key: &str) -> Option<CacheHit> {
        let key = match CacheKey::new(key) {
            Ok(key) => key,
            Err(e) => {
                warn!(error = %e, "Lookup with invalid key treated as miss");
                self.inner.lock().await.stats.record_miss();
                return None;
            }
        };

        {
            let mut inner = self.inner.lock().await;
            if let Some(entry) = inner.memory.get(&key) {
                if !entry.is_expired(self.clock.now(), self.ttl) {
                    inner.stats.record_memory_hit();
                    return Some(CacheHit {
                        payload: entry.payload,
                        tier: Tier::Memory,
                    });
                }
                inner.memory.remove(&key);
                inner.stats.record_expiration();
                debug!(key = %key, "Memory entry expired");
            }
        }

        let entry = match self.disk.read(&key).await {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                self.inner.lock().await.stats.record_miss();
                debug!(key = %key, "Cache miss");
                return None;
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Disk read failed, treating as miss");
                self.inner.lock().await.stats.record_miss();
                return None;
            }
        };

        let mut inner = self.inner.lock().await;
        // A put that raced this read already holds the newer value
        if !inner.memory.contains(&key) {
            inner.memory.set(key.clone(), entry.clone());
        }
        inner.stats.record_disk_hit();
        debug!(key = %key, bytes = entry.cost(), "Promoted disk entry to memory");

        Some(CacheHit {
            payload: entry.payload,
            tier: Tier::Disk,
        })
    }

    // == Get ==
    /// Looks up and decodes a value.
    ///
    /// A payload that no longer decodes as `T` is invalidated and reported as
    /// a miss.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let hit = self.lookup(key).await?;
        match codec::decode(&hit.payload) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "Cached payload failed to decode, invalidating");
                self.invalidate(key).await;
                None
            }
        }
    }

    // == Put ==
    /// Serializes once and writes through to both tiers.
    ///
    /// Only an invalid key or a serialization failure is returned. A failed
    /// disk write is logged and leaves the memory write in place.
    pub async fn put<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let key = CacheKey::new(key)?;
        let payload = codec::encode(value)?;
        self.store(key, payload).await;
        Ok(())
    }

    /// Writes an already encoded JSON payload.
    ///
    /// The payload is validated and normalized once, so memory and disk hold
    /// identical bytes. Non-JSON input is rejected with `Codec`.
    pub async fn put_raw(&self, key: &str, payload: &[u8]) -> Result<()> {
        let key = CacheKey::new(key)?;
        let payload = codec::normalize(payload)?;
        self.store(key, payload).await;
        Ok(())
    }

    async fn store(&self, key: CacheKey, payload: Vec<u8>) {
        let entry = CacheEntry::new(payload, self.clock.now());

        {
            let mut inner = self.inner.lock().await;
            inner.memory.set(key.clone(), entry.clone());
        }

        match self.disk.write_entry(&key, &entry).await {
            Ok(()) => debug!(key = %key, bytes = entry.cost(), "Cached in both tiers"),
            Err(e) => warn!(key = %key, error = %e, "Disk write failed, cached in memory only"),
        }
    }

    // == Invalidate ==
    /// Removes a key from both tiers regardless of freshness.
    pub async fn invalidate(&self, key: &str) {
        let Ok(key) = CacheKey::new(key) else {
            return;
        };

        self.inner.lock().await.memory.remove(&key);

        if let Err(e) = self.disk.remove(&key).await {
            warn!(key = %key, error = %e, "Failed to remove disk entry");
        }
        debug!(key = %key, "Invalidated");
    }

    // == Clear ==
    /// Empties both tiers and resets the counters.
    pub async fn clear(&self) {
        {
            let mut inner = self.inner.lock().await;
            inner.memory.clear();
            inner.memory.reset_evictions();
            inner.stats = CacheStats::new();
        }

        if let Err(e) = self.disk.clear().await {
            warn!(
                dir = %self.disk.directory().display(),
                error = %e,
                "Failed to clear disk cache"
            );
        }
        info!("All cache cleared");
    }

    // == Memory Warning ==
    /// Low-memory hook: drops the memory tier only, later reads go to disk.
    pub async fn handle_memory_warning(&self) -> usize {
        let dropped = self.inner.lock().await.memory.clear();
        info!(entries = dropped, "Memory cache cleared due to memory warning");
        dropped
    }

    /// Whether a key is resident in memory, without touching recency.
    pub async fn in_memory(&self, key: &str) -> bool {
        match CacheKey::new(key) {
            Ok(key) => self.inner.lock().await.memory.contains(&key),
            Err(_) => false,
        }
    }

    // == Stats ==
    pub async fn stats(&self) -> CacheStats {
        let inner = self.inner.lock().await;
        let mut stats = inner.stats.clone();
        stats.evictions = inner.memory.evictions();
        stats.total_entries = inner.memory.len();
        stats.memory_bytes = inner.memory.resident_bytes();
        stats
    }

    /// Bytes currently used by the disk tier.
    pub async fn disk_usage(&self) -> Result<u64> {
        self.disk.total_bytes().await
    }
}
