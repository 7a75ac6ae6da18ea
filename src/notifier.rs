// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Push notifications for new contact submissions.
//!
//! One POST per submission, no retries. Whatever the upstream answers is
//! handed back to the caller to decide on.

use crate::config::NotifyConfig;
use crate::validator::ContactSubmission;
use async_trait::async_trait;
use reqwest::header::HeaderValue;
use thiserror::Error;
use url::Url;

/// Notification delivery errors.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Invalid notification endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Notification request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Notification request timed out after {0:?}")]
    Timeout(std::time::Duration),
}

/// A message ready to be pushed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub priority: u8,
    pub tags: String,
}

impl Notification {
    /// Build the owner-facing message for a validated submission.
    pub fn for_submission(submission: &ContactSubmission, config: &NotifyConfig) -> Self {
        let body = format!(
            "New Contact Form Submission\n\n\
             Name: {}\n\
             Email: {}\n\
             Subject: {}\n\n\
             Message:\n{}",
            submission.name(),
            submission.email(),
            submission.subject(),
            submission.message(),
        );

        Self {
            title: format!("Contact Form: {}", submission.subject()),
            body,
            priority: config.priority,
            tags: config.tags.clone(),
        }
    }
}

/// What the notification service answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchResponse {
    pub status: u16,
    pub body: String,
}

impl DispatchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Delivers notifications to the site owner.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Make a single delivery attempt.
    async fn send(&self, notification: &Notification) -> Result<DispatchResponse, NotifyError>;
}

/// ntfy client
pub struct NtfyNotifier {
    endpoint: Url,
    client: reqwest::Client,
}

impl NtfyNotifier {
    /// Create a client publishing to `{base_url}/{topic}`.
    pub fn new(config: &NotifyConfig, topic: &str) -> Result<Self, NotifyError> {
        let endpoint = topic_url(&config.base_url, topic)?;
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self { endpoint, client })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl Notifier for NtfyNotifier {
    async fn send(&self, notification: &Notification) -> Result<DispatchResponse, NotifyError> {
        let mut request = self.client.post(self.endpoint.clone());
        // Header values must be visible ASCII; ntfy also reads the title
        // from the query string, which carries any UTF-8.
        request = match HeaderValue::from_str(&notification.title) {
            Ok(title) => request.header("Title", title),
            Err(_) => request.query(&[("title", notification.title.as_str())]),
        };

        let response = request
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .header("Priority", notification.priority.to_string())
            .header("Tags", notification.tags.as_str())
            .body(notification.body.clone())
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();

        Ok(DispatchResponse { status, body })
    }
}

fn topic_url(base_url: &str, topic: &str) -> Result<Url, NotifyError> {
    let topic = topic.trim().trim_matches('/');
    if topic.is_empty() || topic.contains('/') {
        return Err(NotifyError::InvalidEndpoint(format!("bad topic {topic:?}")));
    }

    let mut url = Url::parse(base_url)
        .map_err(|e| NotifyError::InvalidEndpoint(format!("{base_url}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(NotifyError::InvalidEndpoint(base_url.to_string()));
    }

    url.path_segments_mut()
        .map_err(|_| NotifyError::InvalidEndpoint(base_url.to_string()))?
        .pop_if_empty()
        .push(topic);
    Ok(url)
}
