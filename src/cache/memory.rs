//! Memory Tier Module
//!
//! Byte-budgeted in-process store with least-recently-used eviction.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::cache::{CacheEntry, CacheKey};

/// A resident entry and its position in the recency order.
#[derive(Debug)]
struct Slot {
    entry: CacheEntry,
    tick: u64,
}

// == Memory Tier ==
/// Cost-weighted key→entry store.
///
/// Cost is the payload length. The sum of resident costs never exceeds the
/// budget: inserting evicts least-recently-used entries first, and an entry
/// that alone exceeds the budget is not kept at all. Recency is tracked with
/// a monotonic tick so eviction order is deterministic.
#[derive(Debug)]
pub struct MemoryTier {
    entries: HashMap<CacheKey, Slot>,
    /// tick → key, oldest first
    recency: BTreeMap<u64, CacheKey>,
    next_tick: u64,
    resident_bytes: usize,
    budget_bytes: usize,
    evictions: u64,
}

impl MemoryTier {
    // == Constructor ==
    pub fn new(budget_bytes: usize) -> Self {
        Self {
            entries: HashMap::new(),
            recency: BTreeMap::new(),
            next_tick: 0,
            resident_bytes: 0,
            budget_bytes,
            evictions: 0,
        }
    }

    // == Set ==
    /// Stores an entry, replacing any previous one under the same key.
    ///
    /// Never fails. Returns `false` when the entry was too large to keep.
    pub fn set(&mut self, key: CacheKey, entry: CacheEntry) -> bool {
        self.remove(&key);

        let cost = entry.cost();
        if cost > self.budget_bytes {
            debug!(
                key = %key,
                cost,
                budget = self.budget_bytes,
                "Entry exceeds memory budget, not retained"
            );
            self.evictions += 1;
            return false;
        }

        while self.resident_bytes + cost > self.budget_bytes {
            if !self.evict_oldest() {
                break;
            }
        }

        let tick = self.bump();
        self.recency.insert(tick, key.clone());
        self.resident_bytes += cost;
        self.entries.insert(key, Slot { entry, tick });
        true
    }

    // == Get ==
    /// Returns a copy of the entry and marks it most recently used.
    ///
    /// Does not look at expiration.
    pub fn get(&mut self, key: &CacheKey) -> Option<CacheEntry> {
        let tick = self.bump();
        let slot = self.entries.get_mut(key)?;
        self.recency.remove(&slot.tick);
        slot.tick = tick;
        self.recency.insert(tick, key.clone());
        Some(slot.entry.clone())
    }

    // == Remove ==
    /// Removes an entry; no-op when absent.
    pub fn remove(&mut self, key: &CacheKey) -> Option<CacheEntry> {
        let slot = self.entries.remove(key)?;
        self.recency.remove(&slot.tick);
        self.resident_bytes -= slot.entry.cost();
        Some(slot.entry)
    }

    // == Clear ==
    /// Drops every entry. Returns how many were resident.
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        self.recency.clear();
        self.resident_bytes = 0;
        count
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn resident_bytes(&self) -> usize {
        self.resident_bytes
    }

    pub fn budget_bytes(&self) -> usize {
        self.budget_bytes
    }

    /// Entries dropped to respect the budget since the last reset.
    pub fn evictions(&self) -> u64 {
        self.evictions
    }

    pub fn reset_evictions(&mut self) {
        self.evictions = 0;
    }

    fn evict_oldest(&mut self) -> bool {
        let Some((_, key)) = self.recency.pop_first() else {
            return false;
        };
        if let Some(slot) = self.entries.remove(&key) {
            self.resident_bytes -= slot.entry.cost();
            self.evictions += 1;
            debug!(key = %key, cost = slot.entry.cost(), "Evicted from memory tier");
        }
        true
    }

    fn bump(&mut self) -> u64 {
        let tick = self.next_tick;
        self.next_tick += 1;
        tick
    }
}
