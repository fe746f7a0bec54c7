// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Metrics collection for abuse simulation results.

use axum::http::StatusCode;
use std::collections::HashMap;
use std::fmt;

/// Possible outcomes for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Accepted,
    RateLimited,
    Rejected,
    Failed,
}

impl From<StatusCode> for Outcome {
    fn from(status: StatusCode) -> Self {
        match status {
            StatusCode::OK => Self::Accepted,
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimited,
            StatusCode::BAD_REQUEST => Self::Rejected,
            _ => Self::Failed,
        }
    }
}

/// Collects outcomes during a simulation.
#[derive(Debug, Default)]
pub struct AttackMetrics {
    outcomes: HashMap<Outcome, usize>,
    requests_per_client: HashMap<String, usize>,
}

impl AttackMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a request outcome.
    pub fn record(&mut self, outcome: Outcome, client: &str) {
        *self.outcomes.entry(outcome).or_insert(0) += 1;
        *self.requests_per_client.entry(client.to_string()).or_insert(0) += 1;
    }

    /// Get total request count.
    pub fn total_requests(&self) -> usize {
        self.outcomes.values().sum()
    }

    /// Get count for a specific outcome.
    pub fn count(&self, outcome: Outcome) -> usize {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    pub fn unique_clients(&self) -> usize {
        self.requests_per_client.len()
    }

    /// Get block rate (ratio of non-accepted to total).
    pub fn block_rate(&self) -> f64 {
        let total = self.total_requests();
        if total == 0 {
            return 0.0;
        }
        (total - self.count(Outcome::Accepted)) as f64 / total as f64
    }
}

impl fmt::Display for AttackMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Simulation Report ===")?;
        writeln!(f, "Total requests: {}", self.total_requests())?;
        writeln!(f, "Unique clients: {}", self.unique_clients())?;
        writeln!(f, "Accepted:       {}", self.count(Outcome::Accepted))?;
        writeln!(f, "Rate limited:   {}", self.count(Outcome::RateLimited))?;
        writeln!(f, "Rejected:       {}", self.count(Outcome::Rejected))?;
        writeln!(f, "Failed:         {}", self.count(Outcome::Failed))?;
        write!(f, "Block rate:     {:.1}%", self.block_rate() * 100.0)
    }
}
