// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact Relay
//!
//! This crate accepts contact form submissions from a personal site and
//! relays them to the owner as push notifications:
//!
//! - Per-client fixed-window rate limiting (3 per 15 minutes default)
//! - Honeypot spam rejection
//! - Field validation with server-side-only error detail
//! - Single-attempt ntfy delivery with a timeout
//! - Generic client-facing error messages

pub mod clock;
pub mod config;
pub mod error;
pub mod handlers;
pub mod limiter;
pub mod metrics;
pub mod notifier;
pub mod pipeline;
pub mod store;
pub mod validator;

pub use config::Config;
pub use error::ContactError;
pub use limiter::{RateLimitResult, RateLimiter};
pub use pipeline::{HandlerResult, SubmissionHandler};
pub use store::{MemoryStore, RateLimitStore};
pub use validator::{ContactSubmission, ContactValidator};
