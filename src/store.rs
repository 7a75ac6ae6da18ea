// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Rate limit record storage.
//!
//! The limiter owns no state of its own. Records live behind
//! [`RateLimitStore`], whose `increment` must roll, compare and bump a
//! record as one atomic step per key. [`MemoryStore`] keeps everything in
//! process memory; records are lost on restart and are not shared between
//! instances.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

/// Storage backend errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Rate limit store unavailable: {0}")]
    Unavailable(String),

    #[error("Rate limit window of {window} from {now} is out of range")]
    WindowOverflow {
        now: DateTime<Utc>,
        window: chrono::Duration,
    },
}

/// Per-identity fixed-window counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitRecord {
    /// Requests admitted in the current window
    pub count: u32,
    /// When the current window ends
    pub reset: DateTime<Utc>,
}

impl RateLimitRecord {
    fn fresh(now: DateTime<Utc>, window: chrono::Duration) -> Result<Self, StoreError> {
        let reset = now
            .checked_add_signed(window)
            .ok_or(StoreError::WindowOverflow { now, window })?;
        Ok(Self { count: 0, reset })
    }

    /// Whether the window has elapsed at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.reset
    }
}

/// Outcome of an atomic check-and-increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Increment {
    /// Record state after the operation
    pub record: RateLimitRecord,
    /// Whether the request was counted (false means the limit was reached)
    pub admitted: bool,
}

/// Backend for rate limit records.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Current record for `key`, if any. Expired records are still returned.
    async fn get(&self, key: &str) -> Result<Option<RateLimitRecord>, StoreError>;

    /// Atomically start a new window if needed, then count the request
    /// unless `max_requests` has already been reached.
    async fn increment(
        &self,
        key: &str,
        max_requests: u32,
        window: chrono::Duration,
        now: DateTime<Utc>,
    ) -> Result<Increment, StoreError>;

    /// Forget `key` entirely.
    async fn reset(&self, key: &str) -> Result<(), StoreError>;

    /// Drop records whose window has ended. Returns how many were removed.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, StoreError>;

    /// Number of tracked keys.
    async fn len(&self) -> Result<usize, StoreError>;
}

/// In-process store guarded by a single write lock.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Arc<RwLock<HashMap<String, RateLimitRecord>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RateLimitStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<RateLimitRecord>, StoreError> {
        Ok(self.records.read().await.get(key).copied())
    }

    async fn increment(
        &self,
        key: &str,
        max_requests: u32,
        window: chrono::Duration,
        now: DateTime<Utc>,
    ) -> Result<Increment, StoreError> {
        let fresh = RateLimitRecord::fresh(now, window)?;
        let mut records = self.records.write().await;
        let record = records.entry(key.to_string()).or_insert(fresh);

        if record.is_expired(now) {
            debug!(key, "Rate limit window rolled over");
            *record = fresh;
        }

        if record.count >= max_requests {
            return Ok(Increment {
                record: *record,
                admitted: false,
            });
        }

        record.count += 1;
        Ok(Increment {
            record: *record,
            admitted: true,
        })
    }

    async fn reset(&self, key: &str) -> Result<(), StoreError> {
        self.records.write().await.remove(key);
        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, StoreError> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, record| !record.is_expired(now));
        Ok(before - records.len())
    }

    async fn len(&self) -> Result<usize, StoreError> {
        Ok(self.records.read().await.len())
    }
}
