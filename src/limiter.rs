// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Fixed-window rate limiter for contact submissions.
//!
//! Each client identity gets `max_requests` submissions per window. The
//! counter lives in an injected [`RateLimitStore`] and time comes from an
//! injected [`Clock`].

use crate::clock::Clock;
use crate::config::RateLimitConfig;
use crate::store::{RateLimitStore, StoreError};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;

/// Result of a rate limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Request is allowed
    Allowed {
        /// Requests allowed per window
        limit: u32,
        /// Remaining requests in current window
        remaining: u32,
        /// When the window resets
        reset: DateTime<Utc>,
    },
    /// Request is rate limited
    Limited {
        /// Requests allowed per window
        limit: u32,
        /// When the window resets
        reset: DateTime<Utc>,
        /// Whole seconds until the window resets, rounded up
        retry_after_secs: u64,
    },
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed { .. })
    }

    pub fn limit(&self) -> u32 {
        match self {
            RateLimitResult::Allowed { limit, .. } | RateLimitResult::Limited { limit, .. } => {
                *limit
            }
        }
    }

    pub fn remaining(&self) -> u32 {
        match self {
            RateLimitResult::Allowed { remaining, .. } => *remaining,
            RateLimitResult::Limited { .. } => 0,
        }
    }

    pub fn reset(&self) -> DateTime<Utc> {
        match self {
            RateLimitResult::Allowed { reset, .. } | RateLimitResult::Limited { reset, .. } => {
                *reset
            }
        }
    }
}

/// Rate limiter over a shared record store.
#[derive(Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    store: Arc<dyn RateLimitStore>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    /// Create a new rate limiter with the given configuration.
    pub fn new(
        config: RateLimitConfig,
        store: Arc<dyn RateLimitStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            store,
            clock,
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Count a request from `identity` and decide whether it may proceed.
    pub async fn check(&self, identity: &str) -> Result<RateLimitResult, StoreError> {
        let key = store_key(identity);
        let now = self.clock.now();
        let limit = self.config.max_requests;

        let inc = self
            .store
            .increment(&key, limit, self.config.window(), now)
            .await?;
        let reset = inc.record.reset;

        if inc.admitted {
            let remaining = limit.saturating_sub(inc.record.count);
            debug!(%identity, remaining, "Submission within rate limit");
            Ok(RateLimitResult::Allowed {
                limit,
                remaining,
                reset,
            })
        } else {
            let retry_after_secs = retry_after_secs(reset, now);
            debug!(%identity, retry_after_secs, "Contact rate limit exceeded");
            Ok(RateLimitResult::Limited {
                limit,
                reset,
                retry_after_secs,
            })
        }
    }

    /// Clear the window for `identity`.
    pub async fn forget(&self, identity: &str) -> Result<(), StoreError> {
        self.store.reset(&store_key(identity)).await
    }

    /// Drop expired records (should be called periodically).
    /// Returns the number of identities still tracked.
    pub async fn cleanup(&self) -> Result<usize, StoreError> {
        let removed = self.store.purge_expired(self.clock.now()).await?;
        if removed > 0 {
            debug!(removed, "Purged expired rate limit records");
        }
        self.store.len().await
    }
}

fn store_key(identity: &str) -> String {
    format!("contact:{identity}")
}

/// `ceil((reset - now) / 1s)`, clamped at zero.
fn retry_after_secs(reset: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let millis = (reset - now).num_milliseconds().max(0) as u64;
    millis.div_ceil(1000)
}
