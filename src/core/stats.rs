use std::path::PathBuf;
use serde::{Serialize, Deserialize};

/// Running cache counters.
///
/// Every `get` bumps `total_requests` once and exactly one of
/// `cache_hits`/`cache_misses`, so `hits + misses == total_requests`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub total_requests: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub expired_entries: u64,
    pub evicted_entries: u64,
}

impl CacheStats {
    /// Hit percentage in `[0, 100]`; 0 when nothing was requested yet.
    pub fn hit_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.cache_hits as f64 / self.total_requests as f64 * 100.0
        }
    }

    pub fn miss_rate(&self) -> f64 {
        100.0 - self.hit_rate()
    }
}

/// Serializable view of [`CacheStats`] with the derived rates filled in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatisticsInfo {
    pub total_requests: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub expired_entries: u64,
    pub evicted_entries: u64,
    pub hit_rate: f64,
    pub miss_rate: f64,
}

impl From<&CacheStats> for StatisticsInfo {
    fn from(stats: &CacheStats) -> Self {
        StatisticsInfo {
            total_requests: stats.total_requests,
            cache_hits: stats.cache_hits,
            cache_misses: stats.cache_misses,
            expired_entries: stats.expired_entries,
            evicted_entries: stats.evicted_entries,
            hit_rate: stats.hit_rate(),
            miss_rate: stats.miss_rate(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryInfo {
    pub entries: usize,
    pub max_entries: usize,
    pub usage_percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiskInfo {
    pub enabled: bool,
    pub size_bytes: u64,
    pub max_size_bytes: u64,
    pub usage_percent: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigurationInfo {
    pub default_ttl_secs: u64,
    pub cache_dir: PathBuf,
}

/// Cache sizing and statistics report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheInfo {
    pub memory: MemoryInfo,
    pub disk: DiskInfo,
    pub statistics: StatisticsInfo,
    pub configuration: ConfigurationInfo,
}

/// Result of an expiry sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    pub memory_removed: usize,
    pub disk_removed: usize,
}

impl SweepReport {
    pub fn total(&self) -> usize {
        self.memory_removed + self.disk_removed
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearReport {
    pub memory_entries: usize,
    pub disk_files: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizeReport {
    pub expired_cleared: usize,
    pub lru_evicted: usize,
    pub disk_bytes_reclaimed: u64,
}

pub(crate) fn percent(used: u64, max: u64) -> f64 {
    if max == 0 {
        0.0
    } else {
        used as f64 / max as f64 * 100.0
    }
}
