// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Outbound mail dispatch.
//!
//! The gateway only sees the [`Mailer`] trait. [`ResendMailer`] posts to the
//! Resend HTTP API; [`LogMailer`] logs the message instead and is used when
//! no API key is configured.

use crate::config::MailConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

/// A fully composed message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutboundEmail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
    pub reply_to: String,
}

/// Provider acknowledgement, passed through to the client untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchReceipt {
    pub id: String,
}

/// Dispatch failures. None of these are retried.
#[derive(Debug, Error)]
pub enum MailError {
    #[error("Mail provider unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Mail provider rejected message ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Mail dispatch timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Invalid mail provider URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Capability to hand a message to a delivery provider.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> Result<DispatchReceipt, MailError>;
}

/// Resend HTTP API client.
pub struct ResendMailer {
    endpoint: Url,
    api_key: String,
    client: reqwest::Client,
}

impl ResendMailer {
    pub fn new(api_base: &Url, api_key: String) -> Result<Self, MailError> {
        Ok(Self {
            endpoint: api_base.join("emails")?,
            api_key,
            client: reqwest::Client::new(),
        })
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<DispatchReceipt, MailError> {
        debug!(endpoint = %self.endpoint, to = ?email.to, "Posting message to mail provider");

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(email)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(response.json::<DispatchReceipt>().await?)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(MailError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}

/// Dry-run mailer: logs instead of sending.
#[derive(Debug, Default)]
pub struct LogMailer {
    sent: AtomicU64,
}

impl LogMailer {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<DispatchReceipt, MailError> {
        let n = self.sent.fetch_add(1, Ordering::Relaxed) + 1;
        info!(
            from = %email.from,
            to = ?email.to,
            subject = %email.subject,
            reply_to = %email.reply_to,
            html_len = email.html.len(),
            "Mail provider not configured, message logged only"
        );
        Ok(DispatchReceipt {
            id: format!("logged-{}", n),
        })
    }
}

/// Pick the provider for the given configuration.
pub fn from_config(config: &MailConfig) -> Result<Arc<dyn Mailer>, MailError> {
    match config.api_key.as_deref() {
        Some(key) if !key.is_empty() => {
            Ok(Arc::new(ResendMailer::new(&config.api_base, key.to_string())?))
        }
        _ => Ok(Arc::new(LogMailer::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email() -> OutboundEmail {
        OutboundEmail {
            from: "Portfolio <noreply@resend.dev>".to_string(),
            to: vec!["owner@example.com".to_string()],
            subject: "[PORTFOLIO] Hello".to_string(),
            html: "<p>Hi</p>".to_string(),
            reply_to: "ada@example.com".to_string(),
        }
    }

    #[test]
    fn test_wire_format() {
        let value = serde_json::to_value(email()).unwrap();
        assert_eq!(value["reply_to"], "ada@example.com");
        assert_eq!(value["to"][0], "owner@example.com");
        assert_eq!(value["html"], "<p>Hi</p>");
    }

    #[test]
    fn test_endpoint_joined_onto_base() {
        let base = Url::parse("https://api.resend.com/").unwrap();
        let mailer = ResendMailer::new(&base, "key".to_string()).unwrap();
        assert_eq!(mailer.endpoint.as_str(), "https://api.resend.com/emails");
    }

    #[tokio::test]
    async fn test_log_mailer_receipts_are_distinct() {
        let mailer = LogMailer::new();
        let a = mailer.send(&email()).await.unwrap();
        let b = mailer.send(&email()).await.unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_no_key_falls_back_to_log_mailer() {
        let config = MailConfig::default();
        assert!(from_config(&config).is_ok());
    }

    #[tokio::test]
    #[ignore] // Requires network access and a real API key
    async fn test_resend_rejects_bad_key() {
        let base = Url::parse("https://api.resend.com/").unwrap();
        let mailer = ResendMailer::new(&base, "invalid".to_string()).unwrap();
        let result = mailer.send(&email()).await;
        assert!(matches!(result, Err(MailError::Rejected { .. })));
    }
}
