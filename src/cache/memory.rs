use chrono::{DateTime, Utc};
use lru::LruCache;
use crate::cache::entry::CacheEntry;
use crate::cache::key::CacheKey;
use crate::core::types::Domain;

/// Recency-ordered memory tier.
///
/// The `LruCache` is unbounded: capacity is enforced by the store through
/// [`MemoryTier::evict_batch`], which drops a tenth of the entries at once
/// instead of one per insert.
pub struct MemoryTier {
    entries: LruCache<CacheKey, CacheEntry>,
    capacity: usize,
}

impl MemoryTier {
    pub fn new(capacity: usize) -> Self {
        MemoryTier {
            entries: LruCache::unbounded(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    pub fn has_room(&self) -> bool {
        !self.is_full()
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains(key)
    }

    /// Lookup that marks the entry as most recently used.
    pub fn get_mut(&mut self, key: &CacheKey) -> Option<&mut CacheEntry> {
        self.entries.get_mut(key)
    }

    pub fn insert(&mut self, key: CacheKey, entry: CacheEntry) -> Option<CacheEntry> {
        self.entries.put(key, entry)
    }

    pub fn remove(&mut self, key: &CacheKey) -> Option<CacheEntry> {
        self.entries.pop(key)
    }

    /// Number of entries one eviction pass removes: 10% of capacity, at least one.
    pub fn eviction_batch_size(&self) -> usize {
        (self.capacity / 10).max(1)
    }

    /// Drop the least recently used batch. Returns the evicted keys, oldest first.
    pub fn evict_batch(&mut self) -> Vec<CacheKey> {
        let count = self.eviction_batch_size();
        let mut evicted = Vec::with_capacity(count);

        for _ in 0..count {
            match self.entries.pop_lru() {
                Some((key, _)) => evicted.push(key),
                None => break,
            }
        }

        evicted
    }

    /// Remove every entry expired at `now`.
    pub fn drain_expired(&mut self, now: DateTime<Utc>) -> Vec<CacheKey> {
        let expired: Vec<CacheKey> = self.entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.entries.pop(key);
        }

        expired
    }

    pub fn remove_domain(&mut self, domain: Domain) -> usize {
        let keys: Vec<CacheKey> = self.entries
            .iter()
            .filter(|(key, _)| key.domain == domain)
            .map(|(key, _)| key.clone())
            .collect();

        for key in &keys {
            self.entries.pop(key);
        }

        keys.len()
    }

    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }
}
