use std::time::Duration;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use crate::core::types::CachePayload;

/// Single cached value with its lifetime and access bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub payload: CachePayload,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub access_count: u64,
    pub last_accessed: Option<DateTime<Utc>>,
}

impl CacheEntry {
    /// Build an entry expiring `ttl` from now. Sub-millisecond TTLs are
    /// rounded up so `expires_at` is always strictly after `created_at`.
    pub fn new(key: String, payload: CachePayload, ttl: Duration) -> Self {
        Self::new_at(key, payload, ttl, Utc::now())
    }

    pub fn new_at(key: String, payload: CachePayload, ttl: Duration, now: DateTime<Utc>) -> Self {
        let ttl = TimeDelta::from_std(ttl)
            .unwrap_or(TimeDelta::MAX)
            .max(TimeDelta::milliseconds(1));
        let expires_at = now.checked_add_signed(ttl).unwrap_or(DateTime::<Utc>::MAX_UTC);

        CacheEntry {
            key,
            payload,
            created_at: now,
            expires_at,
            access_count: 0,
            last_accessed: None,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn access(&mut self) {
        self.access_count += 1;
        self.last_accessed = Some(Utc::now());
    }
}
