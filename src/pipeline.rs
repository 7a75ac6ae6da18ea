// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact submission pipeline.
//!
//! A submission goes through these stages in order, stopping at the first
//! one that fails:
//!
//! 1. Per-client rate limit
//! 2. Honeypot check
//! 3. Field validation
//! 4. Notification target check
//! 5. Notification dispatch
//!
//! Every stage ends in a [`HandlerResult`]. Details of why a stage failed
//! are logged here and never returned to the caller.

use crate::clock::Clock;
use crate::config::{Config, NotifyConfig};
use crate::error::{ContactError, Result};
use crate::limiter::{RateLimitResult, RateLimiter};
use crate::notifier::{Notification, Notifier, NotifyError, NtfyNotifier};
use crate::store::RateLimitStore;
use crate::validator::{ContactForm, ContactValidator};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Final outcome of a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerResult {
    /// Client exceeded its submission quota
    RateLimited {
        retry_after_secs: u64,
        limit: u32,
        remaining: u32,
        reset: DateTime<Utc>,
    },
    /// Honeypot field was filled in
    SpamRejected,
    /// Body or fields did not pass validation
    ValidationFailed,
    /// No notification topic configured
    ConfigurationError,
    /// Notification service failed, timed out or was unreachable
    DispatchFailed,
    /// Unreadable body, store outage, anything else
    Unexpected,
    /// Notification delivered
    Success,
}

impl HandlerResult {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::SpamRejected | Self::ValidationFailed => StatusCode::BAD_REQUEST,
            Self::ConfigurationError | Self::DispatchFailed | Self::Unexpected => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Success => StatusCode::OK,
        }
    }

    /// The only text the client ever sees.
    pub fn client_message(&self) -> &'static str {
        match self {
            Self::RateLimited { .. } => "Too many requests. Please try again later.",
            Self::SpamRejected => "Spam detected",
            Self::ValidationFailed => "Invalid input. Please check your form data and try again.",
            Self::ConfigurationError => {
                "Notification service not configured. Please check server configuration."
            }
            Self::DispatchFailed => "Failed to send notification. Please try again later.",
            Self::Unexpected => "An unexpected error occurred. Please try again later.",
            Self::Success => "Message sent successfully",
        }
    }

    /// Metrics label.
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::RateLimited { .. } => "rate_limited",
            Self::SpamRejected => "spam",
            Self::ValidationFailed => "invalid",
            Self::ConfigurationError => "not_configured",
            Self::DispatchFailed => "dispatch_failed",
            Self::Unexpected => "unexpected",
            Self::Success => "sent",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Runs contact submissions through the pipeline.
pub struct SubmissionHandler {
    limiter: RateLimiter,
    validator: ContactValidator,
    notifier: Option<Arc<dyn Notifier>>,
    notify_config: NotifyConfig,
}

impl SubmissionHandler {
    pub fn new(
        limiter: RateLimiter,
        validator: ContactValidator,
        notifier: Option<Arc<dyn Notifier>>,
        notify_config: NotifyConfig,
    ) -> Self {
        Self {
            limiter,
            validator,
            notifier,
            notify_config,
        }
    }

    /// Wire up a handler from configuration. Without a topic the handler
    /// still runs, but every valid submission ends in `ConfigurationError`.
    pub fn from_config(
        config: &Config,
        store: Arc<dyn RateLimitStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let limiter = RateLimiter::new(config.rate_limit.clone(), store, clock);
        let validator = ContactValidator::new(config.validation.clone())?;
        let notifier = match config.notify.topic.as_deref() {
            Some(topic) => {
                let ntfy = NtfyNotifier::new(&config.notify, topic)?;
                info!(endpoint = %ntfy.endpoint(), "Notifications enabled");
                Some(Arc::new(ntfy) as Arc<dyn Notifier>)
            }
            None => {
                warn!("NTFY_TOPIC is not set, submissions cannot be delivered");
                None
            }
        };

        Ok(Self::new(limiter, validator, notifier, config.notify.clone()))
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Process one raw request body from `identity`.
    pub async fn handle(&self, body: &[u8], identity: &str) -> HandlerResult {
        match self.run(body, identity).await {
            Ok(result) => result,
            Err(err) => {
                error!(%identity, error = %err, details = ?err, "Contact form error");
                HandlerResult::Unexpected
            }
        }
    }

    async fn run(&self, body: &[u8], identity: &str) -> Result<HandlerResult> {
        if let RateLimitResult::Limited {
            limit,
            reset,
            retry_after_secs,
        } = self.limiter.check(identity).await?
        {
            info!(%identity, retry_after_secs, "Contact submission rate limited");
            return Ok(HandlerResult::RateLimited {
                retry_after_secs,
                limit,
                remaining: 0,
                reset,
            });
        }

        // Unparseable and null bodies cannot be read as a form at all; any
        // other non-object value is just a form with no valid fields.
        let mut fields = match serde_json::from_slice::<Value>(body)? {
            Value::Object(fields) => fields,
            Value::Null => return Err(ContactError::NullBody),
            _ => {
                warn!(%identity, "Contact body is not a JSON object");
                return Ok(HandlerResult::ValidationFailed);
            }
        };

        if fields.remove("honeypot").is_some_and(|v| is_filled(&v)) {
            info!(%identity, "Honeypot filled, rejecting submission");
            return Ok(HandlerResult::SpamRejected);
        }

        let form: ContactForm = match serde_json::from_value(Value::Object(fields)) {
            Ok(form) => form,
            Err(e) => {
                warn!(%identity, error = %e, "Contact fields have the wrong shape");
                return Ok(HandlerResult::ValidationFailed);
            }
        };
        let submission = match self.validator.validate(&form) {
            Ok(submission) => submission,
            Err(errors) => {
                warn!(%identity, errors = %errors, "Validation error");
                return Ok(HandlerResult::ValidationFailed);
            }
        };

        let Some(notifier) = self.notifier.as_ref() else {
            error!("NTFY_TOPIC environment variable is not set");
            return Ok(HandlerResult::ConfigurationError);
        };

        let notification = Notification::for_submission(&submission, &self.notify_config);
        let timeout = self.notify_config.timeout();
        let sent = match tokio::time::timeout(timeout, notifier.send(&notification)).await {
            Ok(sent) => sent,
            Err(_) => Err(NotifyError::Timeout(timeout)),
        };

        match sent {
            Ok(response) if response.is_success() => {
                info!(%identity, status = response.status, "Contact notification sent");
                Ok(HandlerResult::Success)
            }
            Ok(response) => {
                error!(
                    status = response.status,
                    body = %response.body,
                    "Notification service rejected message"
                );
                Ok(HandlerResult::DispatchFailed)
            }
            Err(e) => {
                error!(error = %e, "Notification dispatch failed");
                Ok(HandlerResult::DispatchFailed)
            }
        }
    }
}

/// Whether a honeypot value counts as filled in. Mirrors what a browser
/// form library would treat as truthy.
fn is_filled(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
