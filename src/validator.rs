// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Contact form validator.
//!
//! Turns a raw [`ContactForm`] into a trimmed [`ContactSubmission`]:
//! - Name must be non-empty
//! - Email must look like an address
//! - Subject and message must meet minimum lengths
//!
//! Every failing field is reported, so the server log has the full picture.
//! None of this detail is meant for the client.

use crate::config::ValidationConfig;
use regex::Regex;
use serde::Deserialize;
use std::fmt;
use thiserror::Error;
use tracing::debug;

const EMAIL_PATTERN: &str = r"(?i)^[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}$";

/// Raw form fields as posted, honeypot already removed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// A submission that passed validation. Only the validator builds these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmission {
    name: String,
    email: String,
    subject: String,
    message: String,
}

impl ContactSubmission {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A single field problem.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{field} must be at least {min} characters, got {actual}")]
    TooShort {
        field: &'static str,
        min: usize,
        actual: usize,
    },

    #[error("email is not a valid address")]
    InvalidEmail,
}

impl FieldError {
    /// Name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            FieldError::Missing(field) | FieldError::TooShort { field, .. } => *field,
            FieldError::InvalidEmail => "email",
        }
    }
}

/// All field problems found in one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field() == field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Contact form validator.
pub struct ContactValidator {
    config: ValidationConfig,
    email: Regex,
}

impl ContactValidator {
    /// Create a new validator with the given configuration.
    pub fn new(config: ValidationConfig) -> Result<Self, regex::Error> {
        Ok(Self {
            config,
            email: Regex::new(EMAIL_PATTERN)?,
        })
    }

    /// Validate a raw form.
    pub fn validate(&self, form: &ContactForm) -> Result<ContactSubmission, ValidationErrors> {
        let mut errors = Vec::new();

        let name = required(&form.name, "name", &mut errors);
        let email = required(&form.email, "email", &mut errors);
        let subject = required(&form.subject, "subject", &mut errors);
        let message = required(&form.message, "message", &mut errors);

        if let Some(email) = email {
            if !self.email.is_match(email) {
                errors.push(FieldError::InvalidEmail);
            }
        }
        if let Some(subject) = subject {
            min_len(subject, "subject", self.config.min_subject_len, &mut errors);
        }
        if let Some(message) = message {
            min_len(message, "message", self.config.min_message_len, &mut errors);
        }

        match (name, email, subject, message) {
            (Some(name), Some(email), Some(subject), Some(message)) if errors.is_empty() => {
                debug!("Contact form valid");
                Ok(ContactSubmission {
                    name: name.to_string(),
                    email: email.to_string(),
                    subject: subject.to_string(),
                    message: message.to_string(),
                })
            }
            _ => {
                debug!(count = errors.len(), "Contact form invalid");
                Err(ValidationErrors(errors))
            }
        }
    }
}

/// Trimmed value of a required field, recording `Missing` if absent or blank.
fn required<'a>(
    value: &'a Option<String>,
    field: &'static str,
    errors: &mut Vec<FieldError>,
) -> Option<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Some(v),
        _ => {
            errors.push(FieldError::Missing(field));
            None
        }
    }
}

fn min_len(value: &str, field: &'static str, min: usize, errors: &mut Vec<FieldError>) {
    let actual = value.chars().count();
    if actual < min {
        errors.push(FieldError::TooShort { field, min, actual });
    }
}
