// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTML body of the notification sent for each accepted submission.
//!
//! Rendering is pure string building. Every interpolated value must already
//! be escaped; [`Notification::from_submission`] is the only constructor
//! and does the escaping for the fields the validator leaves raw.

use crate::validator::{sanitize_html, SanitizedSubmission};
use chrono::{DateTime, Utc};

const PRIMARY: &str = "#0891b2";
const BACKGROUND: &str = "#f8fafc";
const CARD: &str = "#ffffff";
const TEXT_PRIMARY: &str = "#1f2937";
const TEXT_SECONDARY: &str = "#4b5563";
const TEXT_MUTED: &str = "#6b7280";

/// Escaped values ready for interpolation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    name: String,
    email: String,
    subject: String,
    message: String,
    client_id: String,
    received_at: String,
}

impl Notification {
    pub fn from_submission(
        submission: &SanitizedSubmission,
        client_id: &str,
        received_at: DateTime<Utc>,
    ) -> Self {
        Self {
            name: submission.name.clone(),
            email: sanitize_html(&submission.email),
            subject: submission.subject.clone(),
            message: submission.message.clone(),
            client_id: sanitize_html(client_id),
            received_at: received_at.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        }
    }

    /// Subject line: configured prefix, then the escaped subject.
    pub fn subject_line(&self, prefix: &str) -> String {
        if prefix.is_empty() {
            self.subject.clone()
        } else {
            format!("{} {}", prefix, self.subject)
        }
    }

    pub fn render_html(&self) -> String {
        format!(
            r##"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px; background-color: {BACKGROUND}; border-radius: 8px;">
  <div style="background-color: {PRIMARY}; color: white; padding: 20px; border-radius: 8px 8px 0 0; text-align: center;">
    <h1 style="margin: 0; font-size: 24px;">New Portfolio Message</h1>
  </div>
  <div style="background-color: {CARD}; padding: 30px; border-radius: 0 0 8px 8px;">
    <div style="margin-bottom: 20px;">
      <h2 style="color: {TEXT_PRIMARY}; margin: 0 0 10px 0; font-size: 18px;">Contact details:</h2>
      <p style="margin: 5px 0; color: {TEXT_SECONDARY};"><strong>Name:</strong> {name}</p>
      <p style="margin: 5px 0; color: {TEXT_SECONDARY};"><strong>Email:</strong> {email}</p>
      <p style="margin: 5px 0; color: {TEXT_SECONDARY};"><strong>Subject:</strong> {subject}</p>
      <p style="margin: 5px 0; color: {TEXT_SECONDARY};"><strong>IP:</strong> {client_id}</p>
      <p style="margin: 5px 0; color: {TEXT_SECONDARY};"><strong>Date:</strong> {received_at}</p>
    </div>
    <div style="margin-top: 30px;">
      <h2 style="color: {TEXT_PRIMARY}; margin: 0 0 15px 0; font-size: 18px;">Message:</h2>
      <div style="background-color: #f3f4f6; padding: 20px; border-radius: 6px; border-left: 4px solid {PRIMARY};">
        <p style="margin: 0; line-height: 1.6; color: #374151; white-space: pre-wrap;">{message}</p>
      </div>
    </div>
    <div style="margin-top: 30px; padding-top: 20px; border-top: 1px solid #e5e7eb; text-align: center;">
      <p style="margin: 0; color: {TEXT_MUTED}; font-size: 14px;">Sent from the portfolio contact form.</p>
      <p style="margin: 5px 0 0 0; color: {TEXT_MUTED}; font-size: 14px;">Reply directly to: <strong>{email}</strong></p>
    </div>
  </div>
</div>
"##,
            name = self.name,
            email = self.email,
            subject = self.subject,
            message = self.message,
            client_id = self.client_id,
            received_at = self.received_at,
        )
    }
}
