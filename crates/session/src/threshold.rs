//! Threshold evaluation -- weighted scoring and session classification.
//!
//! Each severity's *scale* is `weight * distinct count`. Classification
//! runs as two independent steps and the second overrides the first:
//!
//! 1. Medium, Low or Informational scale strictly above its soft limit
//!    makes the session `Unstable`.
//! 2. High scale strictly above its soft limit, or the sum of all four
//!    scales strictly above the cumulative soft limit, makes the session
//!    `Failure`.
//!
//! The asymmetry is part of the policy: High alerts alone can only
//! produce `Failure` or nothing, never `Unstable`, while the lower
//! severities reach `Failure` only through the cumulative sum. Equality
//! with a soft limit never triggers anything.

use serde::Serialize;

use scangate_core::types::{AlertSummary, SessionResult, Severity};

use crate::config::ThresholdPolicy;

/// The four computed scales of one evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Scales {
    pub high: i64,
    pub medium: i64,
    pub low: i64,
    pub informational: i64,
}

impl Scales {
    /// Sum of all four scales, compared against the cumulative limit.
    pub fn cumulative(&self) -> i64 {
        self.high
            .saturating_add(self.medium)
            .saturating_add(self.low)
            .saturating_add(self.informational)
    }
}

/// Computes the per-severity scales for a summary under a policy.
pub fn scales(summary: &AlertSummary, policy: &ThresholdPolicy) -> Scales {
    Scales {
        high: scale(policy.high.weight, summary.count(Severity::High)),
        medium: scale(policy.medium.weight, summary.count(Severity::Medium)),
        low: scale(policy.low.weight, summary.count(Severity::Low)),
        informational: scale(
            policy.informational.weight,
            summary.count(Severity::Informational),
        ),
    }
}

fn scale(weight: i64, count: u64) -> i64 {
    weight.saturating_mul(i64::try_from(count).unwrap_or(i64::MAX))
}

/// Classifies a session from its alert summary and threshold policy.
pub fn evaluate(summary: &AlertSummary, policy: &ThresholdPolicy) -> SessionResult {
    let s = scales(summary, policy);
    let mut result = SessionResult::Success;

    if s.medium > policy.medium.soft_limit
        || s.low > policy.low.soft_limit
        || s.informational > policy.informational.soft_limit
    {
        result = SessionResult::Unstable;
    }
    if s.high > policy.high.soft_limit || s.cumulative() > policy.cumulative_soft_limit {
        result = SessionResult::Failure;
    }

    result
}
