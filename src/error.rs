// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Internal error types for the contact relay.
//!
//! These never reach the client. Startup surfaces them to `main`; during a
//! request the submission pipeline logs them and answers with a fixed
//! generic message instead.

use thiserror::Error;

/// Failures outside the expected submission outcomes.
#[derive(Debug, Error)]
pub enum ContactError {
    #[error("Rate limit store error: {0}")]
    Store(#[from] crate::store::StoreError),

    #[error("Notification error: {0}")]
    Notify(#[from] crate::notifier::NotifyError),

    #[error("Invalid validation pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Malformed request body: {0}")]
    MalformedBody(#[from] serde_json::Error),

    #[error("Request body is null")]
    NullBody,
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ContactError>;
