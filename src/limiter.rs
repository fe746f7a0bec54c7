// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Per-client attempt limiter for contact submissions.
//!
//! Counts submissions that reached dispatch, per client identifier, inside
//! a window measured from the client's most recent attempt. A client that
//! keeps trying just before expiry keeps its window open.
//!
//! State is in-memory and per-process. The [`AttemptStore`] trait is the
//! seam for a shared store.

use crate::clock::{Clock, SystemClock};
use crate::config::RateLimitConfig;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

/// Result of recording an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Attempt counted
    Allowed {
        /// Attempts left in the current window
        remaining: u32,
    },
    /// Cap already reached; nothing recorded
    Limited {
        /// Time until the client's window expires
        retry_after: Duration,
    },
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }
}

/// Attempt accounting behind the intake gateway.
#[async_trait]
pub trait AttemptStore: Send + Sync {
    /// Sweep expired records, then report whether `client` is at its cap.
    /// Returns the time until the window expires when limited.
    async fn is_limited(&self, client: &str) -> Option<Duration>;

    /// Count one attempt for `client`, refusing if the cap was reached in
    /// the meantime. Check and increment happen under one lock.
    async fn record_attempt(&self, client: &str) -> RateLimitResult;

    /// Drop every expired record. Returns how many were removed.
    async fn sweep(&self) -> usize;
}

/// Attempts seen from one client.
#[derive(Debug, Clone, Copy)]
struct AttemptRecord {
    count: u32,
    last_attempt: Instant,
}

impl AttemptRecord {
    fn is_expired(&self, now: Instant, window: Duration) -> bool {
        now.saturating_duration_since(self.last_attempt) > window
    }

    fn retry_after(&self, now: Instant, window: Duration) -> Duration {
        window.saturating_sub(now.saturating_duration_since(self.last_attempt))
    }
}

/// In-memory limiter, one mutex over the whole record set.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    clock: Arc<dyn Clock>,
    records: Mutex<HashMap<String, AttemptRecord>>,
}

impl RateLimiter {
    /// Create a new rate limiter on the system clock.
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            records: Mutex::new(HashMap::new()),
        }
    }

    /// Number of records currently held, expired or not.
    pub async fn tracked_clients(&self) -> usize {
        self.records.lock().await.len()
    }

    /// Current count for `client`, treating an expired record as absent.
    pub async fn attempts(&self, client: &str) -> u32 {
        let now = self.clock.now();
        let window = self.config.window_duration();
        self.records
            .lock()
            .await
            .get(client)
            .filter(|r| !r.is_expired(now, window))
            .map_or(0, |r| r.count)
    }

    fn sweep_locked(
        records: &mut HashMap<String, AttemptRecord>,
        now: Instant,
        window: Duration,
    ) -> usize {
        let before = records.len();
        records.retain(|_, r| !r.is_expired(now, window));
        before - records.len()
    }
}

#[async_trait]
impl AttemptStore for RateLimiter {
    async fn is_limited(&self, client: &str) -> Option<Duration> {
        let now = self.clock.now();
        let window = self.config.window_duration();
        let mut records = self.records.lock().await;

        let swept = Self::sweep_locked(&mut records, now, window);
        if swept > 0 {
            debug!(swept, "Expired attempt records removed");
        }

        let record = records.get(client)?;
        if record.count >= self.config.max_attempts {
            let retry_after = record.retry_after(now, window);
            debug!(client = %client, count = record.count, ?retry_after, "Client at submission cap");
            Some(retry_after)
        } else {
            None
        }
    }

    async fn record_attempt(&self, client: &str) -> RateLimitResult {
        let now = self.clock.now();
        let window = self.config.window_duration();
        let max = self.config.max_attempts;
        let mut records = self.records.lock().await;

        match records.get_mut(client) {
            Some(record) if !record.is_expired(now, window) => {
                if record.count >= max {
                    return RateLimitResult::Limited {
                        retry_after: record.retry_after(now, window),
                    };
                }
                record.count += 1;
                record.last_attempt = now;
                RateLimitResult::Allowed {
                    remaining: max.saturating_sub(record.count),
                }
            }
            _ => {
                if max == 0 {
                    return RateLimitResult::Limited {
                        retry_after: window,
                    };
                }
                records.insert(
                    client.to_string(),
                    AttemptRecord {
                        count: 1,
                        last_attempt: now,
                    },
                );
                RateLimitResult::Allowed {
                    remaining: max - 1,
                }
            }
        }
    }

    async fn sweep(&self) -> usize {
        let now = self.clock.now();
        let mut records = self.records.lock().await;
        Self::sweep_locked(&mut records, now, self.config.window_duration())
    }
}
