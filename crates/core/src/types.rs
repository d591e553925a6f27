//! Domain types shared across the scangate workspace.
//!
//! These are the vocabulary of one scan session: alert severities, the
//! alerts themselves, the per-severity distinct-identity summary, and the
//! final session classification.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Alert severity as reported by the scanning daemon.
///
/// Variants are declared in descending policy weight, the order in which
/// the threshold policy considers them. Use [`Severity::ALL`] for
/// policy-order iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Confirmed high-risk finding.
    High,
    /// Medium-risk finding.
    Medium,
    /// Low-risk finding.
    Low,
    /// Informational finding.
    Informational,
}

impl Severity {
    /// All severities in policy order (descending weight).
    pub const ALL: [Severity; 4] = [
        Severity::High,
        Severity::Medium,
        Severity::Low,
        Severity::Informational,
    ];

    /// Parses the daemon's wire-format `risk` field.
    ///
    /// The daemon reports exactly `"High"`, `"Medium"`, `"Low"` or
    /// `"Informational"`; matching is case-sensitive and exact. Anything
    /// else is a malformed record and returns `None`.
    pub fn from_risk(s: &str) -> Option<Self> {
        match s {
            "High" => Some(Self::High),
            "Medium" => Some(Self::Medium),
            "Low" => Some(Self::Low),
            "Informational" => Some(Self::Informational),
            _ => None,
        }
    }

    /// Parses a severity from configuration input.
    ///
    /// Unlike [`Severity::from_risk`] this is case-insensitive and accepts
    /// common abbreviations.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "high" => Some(Self::High),
            "medium" | "med" => Some(Self::Medium),
            "low" => Some(Self::Low),
            "informational" | "info" => Some(Self::Informational),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => write!(f, "High"),
            Self::Medium => write!(f, "Medium"),
            Self::Low => write!(f, "Low"),
            Self::Informational => write!(f, "Informational"),
        }
    }
}

/// One alert record from the daemon's inventory.
///
/// `name` is the alert identity. It is not unique per occurrence: the same
/// identity may be raised many times during a scan, possibly with
/// different severities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    /// Alert identity (the daemon's `alert` field).
    pub name: String,
    /// Severity (the daemon's `risk` field).
    pub severity: Severity,
}

impl Alert {
    pub fn new(name: impl Into<String>, severity: Severity) -> Self {
        Self {
            name: name.into(),
            severity,
        }
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity, self.name)
    }
}

/// Per-severity counts of *distinct* alert identities.
///
/// Derived fresh for every evaluation; never persisted. Only the first
/// occurrence of each identity contributes (see the aggregator for the
/// exact rule).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertSummary {
    /// Distinct High identities.
    pub high: u64,
    /// Distinct Medium identities.
    pub medium: u64,
    /// Distinct Low identities.
    pub low: u64,
    /// Distinct Informational identities.
    pub informational: u64,
}

impl AlertSummary {
    /// Increments the count for `severity`.
    pub fn record(&mut self, severity: Severity) {
        match severity {
            Severity::High => self.high += 1,
            Severity::Medium => self.medium += 1,
            Severity::Low => self.low += 1,
            Severity::Informational => self.informational += 1,
        }
    }

    /// Count of distinct identities observed with `severity`.
    pub fn count(&self, severity: Severity) -> u64 {
        match severity {
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
            Severity::Informational => self.informational,
        }
    }

    /// Total distinct identities across all severities.
    pub fn total(&self) -> u64 {
        self.high + self.medium + self.low + self.informational
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

impl fmt::Display for AlertSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "high={} medium={} low={} informational={}",
            self.high, self.medium, self.low, self.informational,
        )
    }
}

/// Final classification of one scan session.
///
/// `Ord` is declaration order (`Success < Unstable < Failure`), which lets
/// downgrade logic use `max`. Infrastructure failures are *not* a variant
/// here: they propagate as errors and are surfaced as an aborted build by
/// the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SessionResult {
    /// No threshold exceeded.
    Success,
    /// A Medium/Low/Informational soft limit was exceeded.
    Unstable,
    /// The High or cumulative soft limit was exceeded, or cleanup failed.
    Failure,
}

impl fmt::Display for SessionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "SUCCESS"),
            Self::Unstable => write!(f, "UNSTABLE"),
            Self::Failure => write!(f, "FAILURE"),
        }
    }
}
