//! Session configuration -- launch parameters and threshold policy.
//!
//! Both types are built from the core [`ScangateConfig`] sections via
//! `from_core` and are owned by the orchestrator for the duration of one
//! session; nothing here is process-wide.

use std::collections::BTreeMap;
use std::time::Duration;

use scangate_core::config::{DaemonConfig, ExtraArg, ThresholdsConfig};

/// Launch parameters for one daemon lifecycle.
///
/// Immutable once the launch begins.
#[derive(Debug, Clone)]
pub struct LaunchConfig {
    /// Host the daemon binds its control port to.
    pub host: String,
    /// Control port.
    pub port: u16,
    /// Install directory; also the spawn working directory.
    pub install_dir: String,
    /// Resolved daemon executable path, accepted verbatim.
    ///
    /// Resolution (install dir + platform program name) is the caller's
    /// concern; see [`crate::launch::resolve_program_path`].
    pub program: String,
    /// Daemon home directory (`-dir`); empty means omit.
    pub home_dir: String,
    /// Pre-built session file to load before evaluation; empty means skip.
    pub session_file: String,
    /// Extra option/value pairs, appended in order. Duplicates allowed.
    pub extra_args: Vec<ExtraArg>,
    /// Environment overrides merged over the inherited build environment;
    /// the override wins on key collision.
    pub env_overrides: BTreeMap<String, String>,
    /// Overall readiness-probe budget.
    pub connect_timeout: Duration,
    /// Bounded-join ceiling after shutdown.
    pub join_timeout: Duration,
}

impl LaunchConfig {
    /// Builds a launch configuration from the core `[daemon]` section and
    /// a resolved executable path.
    pub fn from_core(core: &DaemonConfig, program: impl Into<String>) -> Self {
        Self {
            host: core.host.clone(),
            port: core.port,
            install_dir: core.install_dir.clone(),
            program: program.into(),
            home_dir: core.home_dir.clone(),
            session_file: core.session_file.clone(),
            extra_args: core.extra_args.clone(),
            env_overrides: core.env.clone(),
            connect_timeout: Duration::from_secs(core.connect_timeout_secs),
            join_timeout: Duration::from_secs(core.join_timeout_secs),
        }
    }
}

/// Weight and strict ceiling for one severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeverityThreshold {
    /// Contribution of one distinct alert to the severity's scale.
    pub weight: i64,
    /// Strict ceiling on the scale; only `scale > soft_limit` trips.
    pub soft_limit: i64,
}

/// Severity-weighted threshold policy.
///
/// Immutable input supplied by configuration. High participates only in
/// the failure step; Medium/Low/Informational trip the unstable step and
/// feed the cumulative sum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdPolicy {
    pub high: SeverityThreshold,
    pub medium: SeverityThreshold,
    pub low: SeverityThreshold,
    pub informational: SeverityThreshold,
    /// Strict ceiling on the sum of all four scales.
    pub cumulative_soft_limit: i64,
}

impl ThresholdPolicy {
    /// Builds a policy from the core `[thresholds]` section.
    pub fn from_core(core: &ThresholdsConfig) -> Self {
        Self {
            high: SeverityThreshold {
                weight: core.high_weight,
                soft_limit: core.high_soft_limit,
            },
            medium: SeverityThreshold {
                weight: core.medium_weight,
                soft_limit: core.medium_soft_limit,
            },
            low: SeverityThreshold {
                weight: core.low_weight,
                soft_limit: core.low_soft_limit,
            },
            informational: SeverityThreshold {
                weight: core.info_weight,
                soft_limit: core.info_soft_limit,
            },
            cumulative_soft_limit: core.cumulative_soft_limit,
        }
    }
}
