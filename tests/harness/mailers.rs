// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Mail provider stand-ins.

use async_trait::async_trait;
use contact_intake::{DispatchReceipt, MailError, Mailer, OutboundEmail};
use std::sync::Mutex;
use std::time::Duration;

/// Accepts everything and keeps a copy.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutboundEmail>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<DispatchReceipt, MailError> {
        let mut sent = self.sent.lock().unwrap();
        sent.push(email.clone());
        Ok(DispatchReceipt {
            id: format!("msg-{}", sent.len()),
        })
    }
}

/// Provider that refuses every message.
#[derive(Debug, Default)]
pub struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _email: &OutboundEmail) -> Result<DispatchReceipt, MailError> {
        Err(MailError::Rejected {
            status: 503,
            body: "provider unavailable".to_string(),
        })
    }
}

/// Accepts everything after a fixed delay, to widen race windows.
#[derive(Debug, Default)]
pub struct SlowMailer {
    pub delay: Duration,
    inner: RecordingMailer,
}

impl SlowMailer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            inner: RecordingMailer::default(),
        }
    }

    pub fn sent(&self) -> Vec<OutboundEmail> {
        self.inner.sent()
    }
}

#[async_trait]
impl Mailer for SlowMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<DispatchReceipt, MailError> {
        tokio::time::sleep(self.delay).await;
        self.inner.send(email).await
    }
}
