// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prometheus metrics for submission outcomes and dispatch latency.

use prometheus::{Encoder, Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder};

/// Final state a submission reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Accepted,
    RateLimited,
    Invalid,
    DispatchFailed,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::RateLimited => "rate_limited",
            Self::Invalid => "invalid",
            Self::DispatchFailed => "dispatch_failed",
        }
    }
}

/// Service metrics on a private registry.
#[derive(Clone)]
pub struct IntakeMetrics {
    registry: Registry,
    submissions: IntCounterVec,
    dispatch_duration: Histogram,
}

impl IntakeMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let submissions = IntCounterVec::new(
            Opts::new("contact_submissions_total", "Contact submissions by outcome"),
            &["outcome"],
        )?;
        let dispatch_duration = Histogram::with_opts(
            HistogramOpts::new(
                "contact_dispatch_duration_seconds",
                "Time spent handing messages to the mail provider",
            )
            .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        )?;

        registry.register(Box::new(submissions.clone()))?;
        registry.register(Box::new(dispatch_duration.clone()))?;

        Ok(Self {
            registry,
            submissions,
            dispatch_duration,
        })
    }

    pub fn record(&self, outcome: Outcome) {
        self.submissions.with_label_values(&[outcome.as_str()]).inc();
    }

    pub fn observe_dispatch(&self, seconds: f64) {
        self.dispatch_duration.observe(seconds);
    }

    pub fn count(&self, outcome: Outcome) -> u64 {
        self.submissions.with_label_values(&[outcome.as_str()]).get()
    }

    /// Render in the Prometheus text exposition format.
    pub fn render(&self) -> prometheus::Result<String> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_by_outcome() {
        let metrics = IntakeMetrics::new().unwrap();
        metrics.record(Outcome::Accepted);
        metrics.record(Outcome::Invalid);
        metrics.record(Outcome::Invalid);

        assert_eq!(metrics.count(Outcome::Accepted), 1);
        assert_eq!(metrics.count(Outcome::Invalid), 2);
        assert_eq!(metrics.count(Outcome::RateLimited), 0);
    }

    #[test]
    fn test_render_exposition() {
        let metrics = IntakeMetrics::new().unwrap();
        metrics.record(Outcome::DispatchFailed);
        metrics.observe_dispatch(0.2);

        let text = metrics.render().unwrap();
        assert!(text.contains(r#"contact_submissions_total{outcome="dispatch_failed"} 1"#));
        assert!(text.contains("contact_dispatch_duration_seconds_count 1"));
    }
}
