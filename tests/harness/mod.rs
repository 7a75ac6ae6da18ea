// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Shared test harness for the contact relay.
//!
//! Fakes for the notifier and store seams, payload generators, and the
//! abuse simulation used by the security tests.

#![allow(dead_code)]

pub mod attacks;
pub mod fakes;
pub mod generators;
pub mod metrics;

use chrono::{DateTime, TimeZone, Utc};
use contact_relay::{
    clock::ManualClock,
    config::Config,
    limiter::RateLimiter,
    notifier::Notifier,
    pipeline::SubmissionHandler,
    store::{MemoryStore, RateLimitStore},
    validator::ContactValidator,
};
use std::sync::Arc;

/// Fixed start time so reset timestamps are predictable.
pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 5, 4, 10, 0, 0).unwrap()
}

/// Build a handler over a fresh in-memory store.
pub fn handler_with(
    config: &Config,
    clock: &ManualClock,
    notifier: Option<Arc<dyn Notifier>>,
) -> SubmissionHandler {
    handler_with_store(config, clock, Arc::new(MemoryStore::new()), notifier)
}

/// Build a handler over the given store.
pub fn handler_with_store(
    config: &Config,
    clock: &ManualClock,
    store: Arc<dyn RateLimitStore>,
    notifier: Option<Arc<dyn Notifier>>,
) -> SubmissionHandler {
    let limiter = RateLimiter::new(config.rate_limit.clone(), store, Arc::new(clock.clone()));
    let validator = ContactValidator::new(config.validation.clone()).unwrap();
    SubmissionHandler::new(limiter, validator, notifier, config.notify.clone())
}
