//! Metric name constants and description registration.
//!
//! All metric names are defined centrally; modules call
//! `metrics::counter!()` / `metrics::gauge!()` / `metrics::histogram!()`
//! with these constants.
//!
//! # Naming convention
//!
//! - prefix: `scangate_`
//! - suffix: `_total` (counter), `_seconds` (histogram), none (gauge)

// --- label keys ---

/// Severity label key (High, Medium, Low, Informational).
pub const LABEL_SEVERITY: &str = "severity";

/// Result label key (success, unstable, failure, aborted).
pub const LABEL_RESULT: &str = "result";

// --- session metrics ---

/// Sessions run, by final result (counter, label: result).
pub const SESSION_RUNS_TOTAL: &str = "scangate_session_runs_total";

/// Wall-clock duration of a full session (histogram, seconds).
pub const SESSION_DURATION_SECONDS: &str = "scangate_session_duration_seconds";

/// Readiness probe connection attempts (counter).
pub const PROBE_ATTEMPTS_TOTAL: &str = "scangate_probe_attempts_total";

/// Raw alert records fetched from the daemon (counter).
pub const ALERTS_FETCHED_TOTAL: &str = "scangate_alerts_fetched_total";

/// Distinct alert identities after de-duplication (counter, label: severity).
pub const ALERTS_DISTINCT_TOTAL: &str = "scangate_alerts_distinct_total";

/// Failed daemon shutdown calls (counter).
pub const SHUTDOWN_FAILURES_TOTAL: &str = "scangate_shutdown_failures_total";

/// Daemon processes still running when the join window closed (counter).
pub const JOIN_TIMEOUTS_TOTAL: &str = "scangate_join_timeouts_total";

/// Session duration histogram buckets (seconds).
///
/// 1s to 2h; sessions are dominated by the external scan phase.
pub const SESSION_DURATION_BUCKETS: [f64; 8] =
    [1.0, 5.0, 15.0, 60.0, 300.0, 900.0, 3600.0, 7200.0];

/// Registers descriptions for all scangate metrics.
///
/// Call once after installing a global recorder.
pub fn describe_all() {
    use metrics::{describe_counter, describe_histogram};

    describe_counter!(
        SESSION_RUNS_TOTAL,
        "Total scan sessions run, labeled by final result"
    );
    describe_histogram!(
        SESSION_DURATION_SECONDS,
        "Wall-clock duration of a full scan session in seconds"
    );
    describe_counter!(
        PROBE_ATTEMPTS_TOTAL,
        "Total readiness probe connection attempts"
    );
    describe_counter!(
        ALERTS_FETCHED_TOTAL,
        "Total raw alert records fetched from the daemon"
    );
    describe_counter!(
        ALERTS_DISTINCT_TOTAL,
        "Distinct alert identities after de-duplication, labeled by severity"
    );
    describe_counter!(
        SHUTDOWN_FAILURES_TOTAL,
        "Total failed daemon shutdown calls"
    );
    describe_counter!(
        JOIN_TIMEOUTS_TOTAL,
        "Total daemon processes still running when the join window closed"
    );
}
