// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Test doubles for the store and notifier seams.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use contact_relay::notifier::{DispatchResponse, Notification, Notifier, NotifyError};
use contact_relay::store::{Increment, RateLimitRecord, RateLimitStore, StoreError};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Notifier that records what it was asked to send and answers with a
/// canned status.
#[derive(Debug)]
pub struct RecordingNotifier {
    status: u16,
    body: String,
    delay: Option<Duration>,
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn responding(status: u16, body: &str) -> Arc<Self> {
        Arc::new(Self {
            status,
            body: body.to_string(),
            delay: None,
            sent: Mutex::new(Vec::new()),
        })
    }

    /// Answers 200 after the usual ntfy acknowledgement.
    pub fn ok() -> Arc<Self> {
        Self::responding(200, r#"{"id":"abc123","event":"message"}"#)
    }

    /// Sleeps for `delay` before answering 200.
    pub fn hanging(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            status: 200,
            body: String::new(),
            delay: Some(delay),
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, notification: &Notification) -> Result<DispatchResponse, NotifyError> {
        self.sent.lock().unwrap().push(notification.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(DispatchResponse {
            status: self.status,
            body: self.body.clone(),
        })
    }
}

/// Store whose backend is always down.
#[derive(Debug, Default)]
pub struct UnavailableStore;

#[async_trait]
impl RateLimitStore for UnavailableStore {
    async fn get(&self, _key: &str) -> Result<Option<RateLimitRecord>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn increment(
        &self,
        _key: &str,
        _max_requests: u32,
        _window: chrono::Duration,
        _now: DateTime<Utc>,
    ) -> Result<Increment, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn reset(&self, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn purge_expired(&self, _now: DateTime<Utc>) -> Result<usize, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    async fn len(&self) -> Result<usize, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }
}
