use std::time::Duration;
use chrono::Utc;
use parking_lot::Mutex;
use tracing::{debug, info, warn};
use crate::cache::disk::{DiskRead, DiskTier};
use crate::cache::entry::CacheEntry;
use crate::cache::key::CacheKey;
use crate::cache::memory::MemoryTier;
use crate::core::config::CacheConfig;
use crate::core::stats::{
    percent, CacheInfo, CacheStats, ClearReport, ConfigurationInfo, DiskInfo, MemoryInfo,
    OptimizeReport, StatisticsInfo, SweepReport,
};
use crate::core::types::{CachePayload, Domain, ExerciseItem, FoodItem, NutritionInfo};

/// Memory and disk utilization above which `optimize` acts.
const OPTIMIZE_THRESHOLD: f64 = 0.8;

/// Share of the disk budget a cleanup trims down to.
const DISK_LOW_WATER: f64 = 0.8;

/// Two-tier cache: a bounded LRU memory tier in front of a per-domain disk tier.
///
/// All state sits behind one mutex, so a `put`'s check-expire-evict-write
/// sequence is atomic with respect to other calls on the same store. Disk
/// faults never surface: they become misses or skipped writes.
pub struct CacheStore {
    inner: Mutex<CacheInner>,
    config: CacheConfig,
}

struct CacheInner {
    memory: MemoryTier,
    disk: Option<DiskTier>,
    stats: CacheStats,
}

impl CacheStore {
    pub fn new(config: CacheConfig) -> Self {
        let disk = if config.enable_disk_cache {
            Some(DiskTier::open(config.cache_dir.clone(), config.max_disk_size_bytes))
        } else {
            None
        };

        info!(
            "Cache store ready: {} memory entries, default TTL {}s, disk cache {}",
            config.max_memory_entries,
            config.default_ttl_secs,
            if disk.is_some() { "enabled" } else { "disabled" },
        );

        CacheStore {
            inner: Mutex::new(CacheInner {
                memory: MemoryTier::new(config.max_memory_entries),
                disk,
                stats: CacheStats::default(),
            }),
            config,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn get(&self, domain: Domain, identifier: &str) -> Option<CachePayload> {
        self.get_key(&CacheKey::new(domain, identifier))
    }

    pub fn get_key(&self, key: &CacheKey) -> Option<CachePayload> {
        let mut inner = self.inner.lock();
        let inner = &mut *inner;
        let now = Utc::now();
        inner.stats.total_requests += 1;

        // Memory tier
        let mut expired_in_memory = false;
        if let Some(entry) = inner.memory.get_mut(key) {
            if entry.is_expired_at(now) {
                expired_in_memory = true;
            } else {
                entry.access();
                inner.stats.cache_hits += 1;
                debug!("Memory cache hit: {}", key);
                return Some(entry.payload.clone());
            }
        }
        if expired_in_memory {
            inner.memory.remove(key);
            inner.stats.expired_entries += 1;
            debug!("Memory entry expired: {}", key);
        }

        // Disk tier
        let Some(disk) = inner.disk.as_mut() else {
            inner.stats.cache_misses += 1;
            return None;
        };

        match disk.read(key) {
            DiskRead::Missing => {
                inner.stats.cache_misses += 1;
                None
            }
            DiskRead::Corrupt(e) => {
                warn!("Dropping unreadable cache file for {}: {}", key, e);
                disk.remove(key);
                inner.stats.cache_misses += 1;
                None
            }
            DiskRead::Entry(entry) if entry.is_expired_at(now) => {
                disk.remove(key);
                // The mirror of an entry already counted in memory is not counted twice
                if !expired_in_memory {
                    inner.stats.expired_entries += 1;
                }
                inner.stats.cache_misses += 1;
                debug!("Disk entry expired: {}", key);
                None
            }
            DiskRead::Entry(mut entry) => {
                entry.access();
                let payload = entry.payload.clone();
                if inner.memory.capacity() > 0 && inner.memory.has_room() {
                    inner.memory.insert(key.clone(), entry);
                }
                inner.stats.cache_hits += 1;
                debug!("Disk cache hit: {}", key);
                Some(payload)
            }
        }
    }

    /// Store `payload`. A `None` or zero `ttl` means the configured default.
    pub fn put(&self, domain: Domain, identifier: &str, payload: CachePayload, ttl: Option<Duration>) {
        self.put_key(&CacheKey::new(domain, identifier), payload, ttl)
    }

    pub fn put_key(&self, key: &CacheKey, payload: CachePayload, ttl: Option<Duration>) {
        let ttl = match ttl {
            Some(ttl) if !ttl.is_zero() => ttl,
            _ => self.config.default_ttl(),
        };
        let entry = CacheEntry::new(key.namespaced(), payload, ttl);

        let mut inner = self.inner.lock();
        let inner = &mut *inner;

        if inner.memory.capacity() > 0 {
            if !inner.memory.contains(key) && inner.memory.is_full() {
                let evicted = inner.memory.evict_batch().len();
                inner.stats.evicted_entries += evicted as u64;
                debug!("Evicted {} least recently used entries", evicted);
            }
            inner.memory.insert(key.clone(), entry.clone());
        }

        if let Some(disk) = inner.disk.as_mut() {
            if let Err(e) = disk.write(key, &entry) {
                warn!("Disk cache write failed for {}: {}", key, e);
            }
            if disk.is_over_budget() {
                let target = Self::low_water(disk);
                Self::cleanup_disk(disk, &mut inner.stats, target);
            }
        }

        debug!("Cached {} (TTL: {}s)", key, ttl.as_secs());
    }

    pub fn get_food(&self, name: &str) -> Option<Vec<FoodItem>> {
        match self.get(Domain::Food, name) {
            Some(CachePayload::Foods(items)) => Some(items),
            _ => None,
        }
    }

    pub fn put_food(&self, name: &str, items: Vec<FoodItem>, ttl: Option<Duration>) {
        self.put(Domain::Food, name, CachePayload::Foods(items), ttl)
    }

    pub fn get_exercise(&self, name: &str) -> Option<Vec<ExerciseItem>> {
        match self.get(Domain::Exercise, name) {
            Some(CachePayload::Exercises(items)) => Some(items),
            _ => None,
        }
    }

    pub fn put_exercise(&self, name: &str, items: Vec<ExerciseItem>, ttl: Option<Duration>) {
        self.put(Domain::Exercise, name, CachePayload::Exercises(items), ttl)
    }

    pub fn get_nutrition(&self, food_id: &str) -> Option<NutritionInfo> {
        match self.get(Domain::Nutrition, food_id) {
            Some(CachePayload::Nutrition(info)) => Some(info),
            _ => None,
        }
    }

    pub fn put_nutrition(&self, food_id: &str, info: NutritionInfo, ttl: Option<Duration>) {
        self.put(Domain::Nutrition, food_id, CachePayload::Nutrition(info), ttl)
    }

    /// Run one eviction pass over the memory tier. Returns the number evicted.
    pub fn evict(&self) -> usize {
        let mut inner = self.inner.lock();
        let evicted = inner.memory.evict_batch().len();
        inner.stats.evicted_entries += evicted as u64;
        evicted
    }

    /// Remove expired entries from both tiers, plus undecodable disk files.
    pub fn sweep_expired(&self) -> SweepReport {
        let mut inner = self.inner.lock();
        let report = Self::sweep_locked(&mut inner);
        info!(
            "Expired cache sweep: {} memory entries, {} disk files",
            report.memory_removed, report.disk_removed,
        );
        report
    }

    pub fn clear_expired(&self) -> SweepReport {
        self.sweep_expired()
    }

    fn sweep_locked(inner: &mut CacheInner) -> SweepReport {
        let now = Utc::now();
        let memory_removed = inner.memory.drain_expired(now).len();
        let disk_removed = match inner.disk.as_mut() {
            Some(disk) => disk.sweep(now),
            None => 0,
        };

        inner.stats.expired_entries += (memory_removed + disk_removed) as u64;
        SweepReport { memory_removed, disk_removed }
    }

    fn low_water(disk: &DiskTier) -> u64 {
        (disk.max_bytes() as f64 * DISK_LOW_WATER) as u64
    }

    // Expired and corrupt files first; if still over `target_bytes`, oldest files go.
    fn cleanup_disk(disk: &mut DiskTier, stats: &mut CacheStats, target_bytes: u64) -> u64 {
        let before = disk.usage_bytes();

        let expired = disk.sweep(Utc::now());
        stats.expired_entries += expired as u64;

        let trimmed = disk.trim_to(target_bytes);
        stats.evicted_entries += trimmed as u64;

        let reclaimed = before.saturating_sub(disk.usage_bytes());
        info!(
            "Disk cache cleanup: {} expired files, {} trimmed, {} bytes reclaimed",
            expired, trimmed, reclaimed,
        );
        reclaimed
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.lock().stats.clone()
    }

    pub fn info(&self) -> CacheInfo {
        let mut inner = self.inner.lock();
        let inner = &mut *inner;

        let memory = MemoryInfo {
            entries: inner.memory.len(),
            max_entries: inner.memory.capacity(),
            usage_percent: percent(inner.memory.len() as u64, inner.memory.capacity() as u64),
        };

        let disk = match inner.disk.as_mut() {
            Some(disk) => {
                let size_bytes = disk.refresh_usage();
                DiskInfo {
                    enabled: true,
                    size_bytes,
                    max_size_bytes: disk.max_bytes(),
                    usage_percent: percent(size_bytes, disk.max_bytes()),
                }
            }
            None => DiskInfo {
                enabled: false,
                size_bytes: 0,
                max_size_bytes: self.config.max_disk_size_bytes,
                usage_percent: 0.0,
            },
        };

        CacheInfo {
            memory,
            disk,
            statistics: StatisticsInfo::from(&inner.stats),
            configuration: ConfigurationInfo {
                default_ttl_secs: self.config.default_ttl_secs,
                cache_dir: self.config.cache_dir.clone(),
            },
        }
    }

    /// Sweep expired entries, then evict and clean the disk where utilization
    /// is above 80%.
    pub fn optimize(&self) -> OptimizeReport {
        let mut inner = self.inner.lock();
        let inner = &mut *inner;

        let sweep = Self::sweep_locked(inner);

        let capacity = inner.memory.capacity() as f64;
        let lru_evicted = if capacity > 0.0 && inner.memory.len() as f64 > capacity * OPTIMIZE_THRESHOLD {
            let evicted = inner.memory.evict_batch().len();
            inner.stats.evicted_entries += evicted as u64;
            evicted
        } else {
            0
        };

        let disk_bytes_reclaimed = match inner.disk.as_mut() {
            Some(disk) => {
                disk.refresh_usage();
                if disk.usage_bytes() as f64 > disk.max_bytes() as f64 * OPTIMIZE_THRESHOLD {
                    let target = Self::low_water(disk);
                    Self::cleanup_disk(disk, &mut inner.stats, target)
                } else {
                    0
                }
            }
            None => 0,
        };

        let report = OptimizeReport {
            expired_cleared: sweep.total(),
            lru_evicted,
            disk_bytes_reclaimed,
        };
        info!("Cache optimized: {:?}", report);
        report
    }

    /// Drop every entry in both tiers and reset statistics.
    pub fn clear_all(&self) -> ClearReport {
        let mut inner = self.inner.lock();
        let memory_entries = inner.memory.clear();
        let disk_files = match inner.disk.as_mut() {
            Some(disk) => disk.clear(None),
            None => 0,
        };
        inner.stats = CacheStats::default();

        info!("Cache cleared: {} memory entries, {} disk files", memory_entries, disk_files);
        ClearReport { memory_entries, disk_files }
    }

    /// Drop one domain's entries; other domains and statistics are untouched.
    pub fn clear_domain(&self, domain: Domain) -> ClearReport {
        let mut inner = self.inner.lock();
        let memory_entries = inner.memory.remove_domain(domain);
        let disk_files = match inner.disk.as_mut() {
            Some(disk) => disk.clear(Some(domain)),
            None => 0,
        };

        info!("Cleared {} cache: {} memory entries, {} disk files", domain, memory_entries, disk_files);
        ClearReport { memory_entries, disk_files }
    }

    /// Entries currently resident in memory.
    pub fn memory_len(&self) -> usize {
        self.inner.lock().memory.len()
    }

    pub fn is_resident(&self, domain: Domain, identifier: &str) -> bool {
        self.inner.lock().memory.contains(&CacheKey::new(domain, identifier))
    }
}
