// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact Intake
//!
//! This crate provides the server side of a portfolio contact form:
//!
//! - Field presence, type and length validation
//! - Email syntax check and disposable domain blocking
//! - Spam pattern heuristics
//! - HTML escaping of everything embedded in the notification
//! - Per-client attempt limiting (3 per hour by default)
//! - Notification dispatch through a mail provider, with a bounded timeout

pub mod clock;
pub mod config;
pub mod error;
pub mod gateway;
pub mod handlers;
pub mod limiter;
pub mod mailer;
pub mod metrics;
pub mod template;
pub mod validator;

pub use config::Config;
pub use error::IntakeError;
pub use gateway::IntakeGateway;
pub use limiter::{AttemptStore, RateLimitResult, RateLimiter};
pub use mailer::{DispatchReceipt, MailError, Mailer, OutboundEmail};
pub use validator::{SanitizedSubmission, Submission, SubmissionValidator, ValidationError};
