// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Error types for the intake pipeline and their HTTP mapping.

use crate::mailer::MailError;
use crate::validator::ValidationErrors;
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

pub const RATE_LIMITED_MESSAGE: &str = "Too many messages sent. Please try again in an hour.";
pub const INVALID_BODY_MESSAGE: &str = "Invalid request body";
pub const INTERNAL_MESSAGE: &str = "Internal server error";

/// Ways a submission can fail.
#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("Rate limit exceeded")]
    RateLimited { retry_after: Duration },

    #[error("Undecodable request body: {0}")]
    InvalidBody(#[from] serde_json::Error),

    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    #[error("Mail dispatch failed: {0}")]
    Dispatch(#[from] MailError),
}

impl IntakeError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::InvalidBody(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Dispatch(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Vec::new(),
        }
    }
}

impl IntoResponse for IntakeError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Self::RateLimited { retry_after } => {
                // Round up so clients never retry a moment too early.
                let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
                (
                    status,
                    [(header::RETRY_AFTER, secs.to_string())],
                    Json(ErrorResponse::new(RATE_LIMITED_MESSAGE)),
                )
                    .into_response()
            }
            Self::InvalidBody(_) => (status, Json(ErrorResponse::new(INVALID_BODY_MESSAGE))).into_response(),
            Self::Validation(errors) => {
                let details = if errors.len() > 1 {
                    errors.all().iter().map(ToString::to_string).collect()
                } else {
                    Vec::new()
                };
                let body = ErrorResponse {
                    error: errors.summary(),
                    details,
                };
                (status, Json(body)).into_response()
            }
            // Provider detail stays in the logs.
            Self::Dispatch(_) => (status, Json(ErrorResponse::new(INTERNAL_MESSAGE))).into_response(),
        }
    }
}
