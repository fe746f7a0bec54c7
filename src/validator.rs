// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Contact form submission validator.
//!
//! Implements server-side validation for contact submissions:
//! - Required fields and their JSON types
//! - Per-field length bounds
//! - Email address shape
//! - Disposable domain blocking
//! - Spam pattern heuristics
//!
//! Accepted submissions come back with name, subject and message
//! HTML-escaped and ready to interpolate into the notification body.

use crate::config::{ConfigError, FieldBounds, SecurityConfig, ValidationConfig};
use regex::{Regex, RegexBuilder};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::debug;

/// Submission field names, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Email,
    Subject,
    Message,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Subject => "subject",
            Self::Message => "message",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which side of a length range was violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthViolation {
    TooShort { min: usize },
    TooLong { max: usize },
}

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("All fields are required (missing: {0})")]
    MissingField(Field),

    #[error("Invalid data: {0} must be text")]
    InvalidType(Field),

    #[error("{}", describe_length(.field, .violation, .actual))]
    LengthOutOfRange {
        field: Field,
        violation: LengthViolation,
        actual: usize,
    },

    #[error("Invalid email address")]
    InvalidEmailSyntax,

    #[error("Temporary email addresses are not allowed ({domain})")]
    BlockedDomain { domain: String },

    #[error("Message not allowed")]
    SpamDetected,
}

fn describe_length(field: &Field, violation: &LengthViolation, actual: &usize) -> String {
    match *violation {
        LengthViolation::TooShort { min } => format!(
            "{} is too short: at least {} characters required, got {}",
            field, min, actual
        ),
        LengthViolation::TooLong { max } => format!(
            "{} is too long: at most {} characters allowed, got {}",
            field, max, actual
        ),
    }
}

/// Every problem found in one submission, in check order. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    /// The error surfaced to the caller.
    pub fn first(&self) -> &ValidationError {
        &self.0[0]
    }

    pub fn all(&self) -> &[ValidationError] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, predicate: impl Fn(&ValidationError) -> bool) -> bool {
        self.0.iter().any(predicate)
    }

    /// One-line description for the response. Length problems are reported
    /// together so every offending field is named; anything else reports
    /// the first error.
    pub fn summary(&self) -> String {
        if !matches!(self.first(), ValidationError::LengthOutOfRange { .. }) {
            return self.first().to_string();
        }
        self.0
            .iter()
            .filter(|e| matches!(e, ValidationError::LengthOutOfRange { .. }))
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

impl std::error::Error for ValidationErrors {}

/// A candidate submission as decoded from the request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl Submission {
    /// Pull the four fields out of a decoded JSON body.
    ///
    /// Absent, null and empty-string fields are `MissingField`; any other
    /// non-string value is `InvalidType`.
    pub fn from_json(body: &Value) -> Result<Self, ValidationErrors> {
        let take = |field: Field| -> Result<String, ValidationError> {
            match body.get(field.as_str()) {
                None | Some(Value::Null) => Err(ValidationError::MissingField(field)),
                Some(Value::String(s)) if s.is_empty() => {
                    Err(ValidationError::MissingField(field))
                }
                Some(Value::String(s)) => Ok(s.clone()),
                Some(_) => Err(ValidationError::InvalidType(field)),
            }
        };

        match (
            take(Field::Name),
            take(Field::Email),
            take(Field::Subject),
            take(Field::Message),
        ) {
            (Ok(name), Ok(email), Ok(subject), Ok(message)) => Ok(Self {
                name,
                email,
                subject,
                message,
            }),
            (name, email, subject, message) => {
                let mut errors: Vec<ValidationError> =
                    [name.err(), email.err(), subject.err(), message.err()]
                        .into_iter()
                        .flatten()
                        .collect();
                // Missing fields outrank type errors.
                errors.sort_by_key(|e| !matches!(e, ValidationError::MissingField(_)));
                Err(ValidationErrors(errors))
            }
        }
    }
}

/// A submission that passed every check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedSubmission {
    /// HTML-escaped
    pub name: String,
    /// As submitted. Escape before embedding in markup.
    pub email: String,
    /// HTML-escaped
    pub subject: String,
    /// HTML-escaped
    pub message: String,
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static regex"))
}

/// Check only the `local@domain.tld` shape of an address.
pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

/// Lowercased text after the last `@`, if any.
pub fn email_domain(email: &str) -> Option<String> {
    email
        .rsplit_once('@')
        .map(|(_, domain)| domain.to_lowercase())
}

/// Escape the five HTML-significant characters.
pub fn sanitize_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Contact submission validator.
///
/// Holds only compiled configuration; `validate` is pure and safe to share
/// across tasks.
#[derive(Debug)]
pub struct SubmissionValidator {
    bounds: ValidationConfig,
    blocked_domains: HashSet<String>,
    spam_patterns: Vec<Regex>,
}

impl SubmissionValidator {
    /// Create a new validator, compiling the spam patterns.
    pub fn new(bounds: ValidationConfig, security: &SecurityConfig) -> Result<Self, ConfigError> {
        let spam_patterns = security
            .spam_patterns
            .iter()
            .map(|pattern| {
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| ConfigError::InvalidSpamPattern {
                        pattern: pattern.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let blocked_domains = security
            .blocked_domains
            .iter()
            .map(|d| d.trim().to_lowercase())
            .collect();

        Ok(Self {
            bounds,
            blocked_domains,
            spam_patterns,
        })
    }

    /// Decode a JSON body and validate it.
    pub fn validate_json(&self, body: &Value) -> Result<SanitizedSubmission, ValidationErrors> {
        let submission = Submission::from_json(body)?;
        self.validate(&submission)
    }

    /// Validate a submission, collecting every problem found.
    ///
    /// Checks run on the text as submitted; trimming happens only when
    /// building the sanitized output.
    pub fn validate(&self, submission: &Submission) -> Result<SanitizedSubmission, ValidationErrors> {
        let Submission {
            name,
            email,
            subject,
            message,
        } = submission;

        let email_bounds = FieldBounds::new(1, self.bounds.email_max_length);
        let checks = [
            (Field::Name, name, self.bounds.name),
            (Field::Email, email, email_bounds),
            (Field::Subject, subject, self.bounds.subject),
            (Field::Message, message, self.bounds.message),
        ];
        let mut errors: Vec<ValidationError> = checks
            .into_iter()
            .filter_map(|(field, value, bounds)| check_length(field, value, bounds))
            .collect();
        // Too long outranks too short.
        errors.sort_by_key(|e| {
            !matches!(
                e,
                ValidationError::LengthOutOfRange {
                    violation: LengthViolation::TooLong { .. },
                    ..
                }
            )
        });

        if !is_valid_email(email) {
            debug!("Email syntax invalid");
            errors.push(ValidationError::InvalidEmailSyntax);
        } else if let Some(domain) = email_domain(email) {
            if self.blocked_domains.contains(&domain) {
                debug!(domain = %domain, "Blocked email domain");
                errors.push(ValidationError::BlockedDomain { domain });
            }
        }

        if self.is_spam(name, subject, message) {
            debug!("Spam pattern matched");
            errors.push(ValidationError::SpamDetected);
        }

        if !errors.is_empty() {
            return Err(ValidationErrors(errors));
        }

        Ok(SanitizedSubmission {
            name: sanitize_html(name.trim()),
            email: email.clone(),
            subject: sanitize_html(subject.trim()),
            message: sanitize_html(message.trim()),
        })
    }

    fn is_spam(&self, name: &str, subject: &str, message: &str) -> bool {
        let full_text = format!("{} {} {}", name, subject, message).to_lowercase();
        self.spam_patterns.iter().any(|p| p.is_match(&full_text))
    }
}

fn check_length(field: Field, value: &str, bounds: FieldBounds) -> Option<ValidationError> {
    let actual = value.chars().count();
    let violation = if actual > bounds.max_length {
        LengthViolation::TooLong {
            max: bounds.max_length,
        }
    } else if actual < bounds.min_length {
        LengthViolation::TooShort {
            min: bounds.min_length,
        }
    } else {
        return None;
    };
    Some(ValidationError::LengthOutOfRange {
        field,
        violation,
        actual,
    })
}
