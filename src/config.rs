// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the contact relay.
//!
//! Defaults match the contact endpoint policy: 3 submissions per client per
//! 15 minute window, notifications relayed through ntfy.sh.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// Configuration for the contact relay service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Maximum accepted request body in bytes (default: 64 KiB)
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Take the client identity from `X-Forwarded-For` / `X-Real-IP`
    /// instead of the peer address (default: false)
    #[serde(default)]
    pub trust_forwarded_for: bool,

    /// Origins allowed to call the API from a browser. Empty disables CORS.
    #[serde(default)]
    pub allowed_origins: Vec<String>,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Validation configuration
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Notification configuration
    #[serde(default)]
    pub notify: NotifyConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Longest accepted rate limit window in milliseconds (30 days).
pub const MAX_WINDOW_MS: i64 = 30 * 24 * 60 * 60 * 1000;

/// Fixed-window rate limiting for the contact endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Window length in milliseconds (default: 900000, i.e. 15 minutes)
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,

    /// Submissions allowed per client per window (default: 3)
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    /// How often expired records are purged, in seconds (default: 60)
    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,
}

/// Field rules for contact submissions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Minimum subject length after trimming (default: 2)
    #[serde(default = "default_min_subject_len")]
    pub min_subject_len: usize,

    /// Minimum message length after trimming (default: 10)
    #[serde(default = "default_min_message_len")]
    pub min_message_len: usize,
}

/// Outbound push notification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Base URL of the ntfy server (default: https://ntfy.sh)
    #[serde(default = "default_ntfy_base_url")]
    pub base_url: String,

    /// Topic to publish to. Unset means notifications are not configured.
    #[serde(default)]
    pub topic: Option<String>,

    /// ntfy priority header, 1-5 (default: 3)
    #[serde(default = "default_priority")]
    pub priority: u8,

    /// ntfy tags header (default: envelope,email)
    #[serde(default = "default_tags")]
    pub tags: String,

    /// Upper bound on the outbound call in milliseconds (default: 10000)
    #[serde(default = "default_notify_timeout_ms")]
    pub timeout_ms: u64,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics endpoint (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metrics endpoint path (default: /metrics)
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_max_body_bytes() -> usize {
    64 * 1024
}

fn default_window_ms() -> u64 {
    15 * 60 * 1000
}

fn default_max_requests() -> u32 {
    3
}

fn default_cleanup_interval_secs() -> u64 {
    60
}

fn default_min_subject_len() -> usize {
    2
}

fn default_min_message_len() -> usize {
    10
}

fn default_ntfy_base_url() -> String {
    "https://ntfy.sh".to_string()
}

fn default_priority() -> u8 {
    3
}

fn default_tags() -> String {
    "envelope,email".to_string()
}

fn default_notify_timeout_ms() -> u64 {
    10_000
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            max_body_bytes: default_max_body_bytes(),
            trust_forwarded_for: false,
            allowed_origins: Vec::new(),
            rate_limit: RateLimitConfig::default(),
            validation: ValidationConfig::default(),
            notify: NotifyConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_ms: default_window_ms(),
            max_requests: default_max_requests(),
            cleanup_interval_secs: default_cleanup_interval_secs(),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_subject_len: default_min_subject_len(),
            min_message_len: default_min_message_len(),
        }
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            base_url: default_ntfy_base_url(),
            topic: None,
            priority: default_priority(),
            tags: default_tags(),
            timeout_ms: default_notify_timeout_ms(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

impl RateLimitConfig {
    /// Get the window length, clamped to `1..=MAX_WINDOW_MS`
    pub fn window(&self) -> chrono::Duration {
        let ms = i64::try_from(self.window_ms)
            .map_or(MAX_WINDOW_MS, |ms| ms.clamp(1, MAX_WINDOW_MS));
        chrono::Duration::milliseconds(ms)
    }

    /// Get the cleanup interval
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs.max(1))
    }
}

impl NotifyConfig {
    /// Get the outbound call timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup, falling back to
    /// defaults for missing or unparseable values.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        Config {
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            max_body_bytes: parse_var(&lookup, "MAX_BODY_BYTES")
                .unwrap_or(defaults.max_body_bytes),
            trust_forwarded_for: parse_var(&lookup, "TRUST_FORWARDED_FOR")
                .unwrap_or(defaults.trust_forwarded_for),
            allowed_origins: lookup("ALLOWED_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|o| !o.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or(defaults.allowed_origins),
            rate_limit: RateLimitConfig {
                window_ms: parse_var(&lookup, "RATE_LIMIT_WINDOW_MS")
                    .filter(|ms| window_in_range(*ms))
                    .unwrap_or(defaults.rate_limit.window_ms),
                max_requests: parse_var(&lookup, "RATE_LIMIT_MAX_REQUESTS")
                    .unwrap_or(defaults.rate_limit.max_requests),
                cleanup_interval_secs: parse_var(&lookup, "CLEANUP_INTERVAL_SECS")
                    .unwrap_or(defaults.rate_limit.cleanup_interval_secs),
            },
            validation: defaults.validation,
            notify: NotifyConfig {
                base_url: lookup("NTFY_BASE_URL").unwrap_or(defaults.notify.base_url),
                // An empty topic counts as unset.
                topic: lookup("NTFY_TOPIC")
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty()),
                priority: parse_var(&lookup, "NTFY_PRIORITY")
                    .unwrap_or(defaults.notify.priority),
                tags: lookup("NTFY_TAGS").unwrap_or(defaults.notify.tags),
                timeout_ms: parse_var(&lookup, "NOTIFY_TIMEOUT_MS")
                    .unwrap_or(defaults.notify.timeout_ms),
            },
            metrics: MetricsConfig {
                enabled: parse_var(&lookup, "METRICS_ENABLED")
                    .unwrap_or(defaults.metrics.enabled),
                path: lookup("METRICS_PATH").unwrap_or(defaults.metrics.path),
            },
        }
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "Ignoring unparseable environment variable");
            None
        }
    }
}

/// A zero window disables limiting, a huge one overflows timestamps.
fn window_in_range(window_ms: u64) -> bool {
    let ok = i64::try_from(window_ms).is_ok_and(|ms| (1..=MAX_WINDOW_MS).contains(&ms));
    if !ok {
        warn!(
            window_ms,
            max_window_ms = MAX_WINDOW_MS,
            "Ignoring out of range RATE_LIMIT_WINDOW_MS"
        );
    }
    ok
}
