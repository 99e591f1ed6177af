//! Prometheus metrics.
//!
//! Each [`Metrics`] owns its own registry so that several servers (or tests)
//! in one process never collide on metric names.

use std::fmt;

use prometheus::{IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use tally_counter::Counter;
use tally_rbac::{Decision, Permission};

/// Outcome label for `tally_increments_total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncrementOutcome {
    Committed,
    InvalidDelta,
    Overflow,
}

impl IncrementOutcome {
    fn as_str(self) -> &'static str {
        match self {
            IncrementOutcome::Committed => "committed",
            IncrementOutcome::InvalidDelta => "invalid_delta",
            IncrementOutcome::Overflow => "overflow",
        }
    }
}

/// Server metrics.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    decisions: IntCounterVec,
    increments: IntCounterVec,
    counter_value: IntGauge,
    counter_commits: IntGauge,
}

impl Metrics {
    /// Creates and registers all metrics.
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let decisions = IntCounterVec::new(
            Opts::new(
                "tally_authz_decisions_total",
                "Access decisions by permission and outcome",
            ),
            &["permission", "decision"],
        )?;
        let increments = IntCounterVec::new(
            Opts::new("tally_increments_total", "Increment attempts by outcome"),
            &["outcome"],
        )?;
        let counter_value = IntGauge::new("tally_counter_value", "Current counter value")?;
        let counter_commits =
            IntGauge::new("tally_counter_commits", "Increments committed since start")?;

        registry.register(Box::new(decisions.clone()))?;
        registry.register(Box::new(increments.clone()))?;
        registry.register(Box::new(counter_value.clone()))?;
        registry.register(Box::new(counter_commits.clone()))?;

        Ok(Self {
            registry,
            decisions,
            increments,
            counter_value,
            counter_commits,
        })
    }

    /// Records one access decision.
    pub fn record_decision(&self, permission: &Permission, decision: Decision) {
        self.decisions
            .with_label_values(&[permission.as_str(), decision.as_str()])
            .inc();
    }

    /// Records one increment attempt.
    pub fn record_increment(&self, outcome: IncrementOutcome) {
        self.increments.with_label_values(&[outcome.as_str()]).inc();
    }

    /// Renders the text exposition format, sampling `counter` first.
    pub fn render(&self, counter: &Counter) -> prometheus::Result<String> {
        self.counter_value.set(counter.read());
        self.counter_commits.set(counter.commits() as i64);

        TextEncoder::new().encode_to_string(&self.registry.gather())
    }
}

impl fmt::Debug for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Metrics").finish_non_exhaustive()
    }
}
