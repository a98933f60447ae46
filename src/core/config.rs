use std::path::{Path, PathBuf};
use std::time::Duration;
use serde::{Deserialize, Serialize};
use crate::core::error::{Error, ErrorKind, Result};

/// Top-level configuration, loadable from a (partial) JSON document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub cache: CacheConfig,
    pub search: SearchConfig,
}

impl Config {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.search.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub max_memory_entries: usize,   // Memory tier capacity
    pub default_ttl_secs: u64,       // TTL when put() gets none
    pub cache_dir: PathBuf,          // Root of the disk tier
    pub enable_disk_cache: bool,
    pub max_disk_size_bytes: u64,    // Global disk budget (all domains)
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            max_memory_entries: 1000,
            default_ttl_secs: 3600,                 // 1 hour
            cache_dir: PathBuf::from(".cache"),
            enable_disk_cache: true,
            max_disk_size_bytes: 100 * 1024 * 1024, // 100MB
        }
    }
}

impl CacheConfig {
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_secs)
    }

    /// Memory-only cache, mostly useful for tests and short-lived tools.
    pub fn memory_only(max_memory_entries: usize) -> Self {
        CacheConfig {
            max_memory_entries,
            enable_disk_cache: false,
            ..Default::default()
        }
    }

    pub fn with_dir(cache_dir: impl Into<PathBuf>) -> Self {
        CacheConfig {
            cache_dir: cache_dir.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    // Pools
    pub max_workers: usize,            // Batch fan-out width
    pub domain_concurrency: usize,     // Per-query domain dispatch width

    // Retry
    pub retry_count: usize,            // Attempts per domain, including the first
    pub retry_delay_ms: u64,           // Multiplied by the attempt number

    // History
    pub history_capacity: usize,
    pub history_evict_batch: usize,

    // Suggestions
    pub max_suggestions: usize,
    pub suggestion_threshold: f64,
    pub min_suggestion_len: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            max_workers: 5,
            domain_concurrency: 2,
            retry_count: 3,
            retry_delay_ms: 1000,
            history_capacity: 1000,
            history_evict_batch: 100,
            max_suggestions: 5,
            suggestion_threshold: 0.6,
            min_suggestion_len: 2,
        }
    }
}

impl SearchConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Domain dispatch width, clamped into `1..=max_workers`.
    pub fn effective_domain_concurrency(&self) -> usize {
        self.domain_concurrency.clamp(1, self.max_workers.max(1))
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_workers == 0 {
            return Err(Error::new(ErrorKind::InvalidConfig, "max_workers must be at least 1".to_string()));
        }
        if self.retry_count == 0 {
            return Err(Error::new(ErrorKind::InvalidConfig, "retry_count must be at least 1".to_string()));
        }
        if !(0.0..=1.0).contains(&self.suggestion_threshold) {
            return Err(Error::new(
                ErrorKind::InvalidConfig,
                format!("suggestion_threshold {} outside [0, 1]", self.suggestion_threshold),
            ));
        }
        Ok(())
    }
}
