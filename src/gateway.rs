// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Intake gateway: one submission, end to end.
//!
//! ```text
//! received -> rate checked -> validated -> sanitized -> dispatched -> responded
//! ```
//!
//! Any failed gate returns early. Quota is consumed only once a submission
//! has passed validation, and the limiter lock is never held across the
//! mail provider call.

use crate::config::{Config, ConfigError, MailConfig};
use crate::error::IntakeError;
use crate::limiter::{AttemptStore, RateLimitResult};
use crate::mailer::{DispatchReceipt, MailError, Mailer, OutboundEmail};
use crate::metrics::{IntakeMetrics, Outcome};
use crate::template::Notification;
use crate::validator::{SanitizedSubmission, SubmissionValidator};
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Sentinel client identifier when nothing better is known.
/// All such clients share one rate-limit bucket.
pub const UNKNOWN_CLIENT: &str = "unknown";

pub struct IntakeGateway {
    validator: SubmissionValidator,
    limiter: Arc<dyn AttemptStore>,
    mailer: Arc<dyn Mailer>,
    mail: MailConfig,
    metrics: IntakeMetrics,
}

impl IntakeGateway {
    pub fn new(
        config: &Config,
        limiter: Arc<dyn AttemptStore>,
        mailer: Arc<dyn Mailer>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            validator: SubmissionValidator::new(config.validation.clone(), &config.security)?,
            limiter,
            mailer,
            mail: config.mail.clone(),
            metrics: IntakeMetrics::new()?,
        })
    }

    pub fn metrics(&self) -> &IntakeMetrics {
        &self.metrics
    }

    /// Process one raw request body from `client_id`.
    pub async fn submit(&self, client_id: &str, body: &[u8]) -> Result<DispatchReceipt, IntakeError> {
        let result = self.process(client_id, body).await;

        let outcome = match &result {
            Ok(_) => Outcome::Accepted,
            Err(IntakeError::RateLimited { .. }) => Outcome::RateLimited,
            Err(IntakeError::InvalidBody(_)) | Err(IntakeError::Validation(_)) => Outcome::Invalid,
            Err(IntakeError::Dispatch(_)) => Outcome::DispatchFailed,
        };
        self.metrics.record(outcome);

        result
    }

    async fn process(&self, client_id: &str, body: &[u8]) -> Result<DispatchReceipt, IntakeError> {
        if let Some(retry_after) = self.limiter.is_limited(client_id).await {
            info!(client = %client_id, retry_after_secs = retry_after.as_secs(), "Submission rate limited");
            return Err(IntakeError::RateLimited { retry_after });
        }

        let value: Value = serde_json::from_slice(body).map_err(|e| {
            info!(client = %client_id, error = %e, "Undecodable submission body");
            e
        })?;

        let submission = self.validator.validate_json(&value).map_err(|errors| {
            info!(client = %client_id, error = %errors, count = errors.len(), "Submission failed validation");
            errors
        })?;

        // Re-checked under the lock; a concurrent request may have taken the last slot.
        match self.limiter.record_attempt(client_id).await {
            RateLimitResult::Allowed { remaining } => {
                debug!(client = %client_id, remaining, "Attempt recorded");
            }
            RateLimitResult::Limited { retry_after } => {
                info!(client = %client_id, "Lost the last slot to a concurrent submission");
                return Err(IntakeError::RateLimited { retry_after });
            }
        }

        let email = self.compose(&submission, client_id);
        self.dispatch(client_id, &email).await
    }

    fn compose(&self, submission: &SanitizedSubmission, client_id: &str) -> OutboundEmail {
        let notification = Notification::from_submission(submission, client_id, Utc::now());
        OutboundEmail {
            from: self.mail.sender(),
            to: self.mail.to.clone(),
            subject: notification.subject_line(&self.mail.subject_prefix),
            html: notification.render_html(),
            reply_to: submission.email.clone(),
        }
    }

    async fn dispatch(&self, client_id: &str, email: &OutboundEmail) -> Result<DispatchReceipt, IntakeError> {
        let timeout = self.mail.dispatch_timeout();
        let started = Instant::now();

        let result = match tokio::time::timeout(timeout, self.mailer.send(email)).await {
            Ok(result) => result,
            Err(_) => Err(MailError::Timeout(timeout)),
        };
        self.metrics.observe_dispatch(started.elapsed().as_secs_f64());

        match result {
            Ok(receipt) => {
                info!(client = %client_id, receipt = %receipt.id, "Submission dispatched");
                Ok(receipt)
            }
            Err(e) => {
                error!(client = %client_id, error = %e, "Failed to send email");
                Err(IntakeError::Dispatch(e))
            }
        }
    }
}
