//! Scan session orchestration -- the full daemon lifecycle.
//!
//! [`ScanSession`] composes the session phases in order: command
//! construction, launch, readiness probe, session load, alert
//! aggregation, threshold evaluation, shutdown, bounded join.
//!
//! # Shutdown guarantee
//!
//! Once the daemon process handle has been obtained, exactly one shutdown
//! attempt is made before `run` returns -- whether evaluation succeeded,
//! failed, or was cancelled. The attempt happens at a single call site
//! after the fallible evaluation block, so the invariant holds by
//! construction. When the handle was never obtained (config or launch
//! error), a shutdown-skipped condition is logged instead.
//!
//! A *failed* shutdown does not propagate: it is logged and downgrades
//! the session result to `Failure`, even over a clean `Success`. This
//! overwrite-on-cleanup-failure is long-standing gate behavior and is
//! kept as-is.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use scangate_core::metrics as m;
use scangate_core::types::{AlertSummary, SessionResult};

use crate::aggregate::AlertAggregator;
use crate::api::ManagementApi;
use crate::command::build_command;
use crate::config::{LaunchConfig, ThresholdPolicy};
use crate::error::SessionError;
use crate::launch::{ProcessHandle, ProcessLauncher};
use crate::probe;
use crate::threshold::{self, Scales};

/// Final report of one scan session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    /// Session identifier (also carried in the logs).
    pub session_id: String,
    /// Policy classification, after any cleanup downgrade.
    pub result: SessionResult,
    /// Distinct-identity counts per severity.
    pub summary: AlertSummary,
    /// Computed scales per severity.
    pub scales: Scales,
    /// Wall-clock session duration in seconds.
    pub elapsed_secs: u64,
    /// Whether the daemon process exited within the join window.
    pub daemon_exited: bool,
}

/// What the evaluation phase produced before cleanup ran.
struct Evaluation {
    summary: AlertSummary,
    scales: Scales,
    result: SessionResult,
}

/// One scan-session orchestrator.
///
/// Owns its configuration and policy for the duration of the session;
/// nothing is shared across sessions. At most one instance may manage a
/// given daemon port.
pub struct ScanSession<A: ManagementApi> {
    config: LaunchConfig,
    policy: ThresholdPolicy,
    api: Arc<A>,
    cancel: CancellationToken,
    session_id: Uuid,
}

impl<A: ManagementApi> ScanSession<A> {
    pub fn new(config: LaunchConfig, policy: ThresholdPolicy, api: Arc<A>) -> Self {
        Self {
            config,
            policy,
            api,
            cancel: CancellationToken::new(),
            session_id: Uuid::new_v4(),
        }
    }

    /// Token that cancels the evaluation phase when triggered.
    ///
    /// A cancelled session still performs its shutdown attempt and
    /// bounded join before returning [`SessionError::Cancelled`].
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Runs the full session lifecycle.
    ///
    /// # Errors
    ///
    /// - [`SessionError::Config`] / [`SessionError::Launch`]: nothing was
    ///   started; no cleanup happens (shutdown skipped).
    /// - [`SessionError::Probe`] / [`SessionError::Api`] /
    ///   [`SessionError::Cancelled`]: the daemon was launched; the
    ///   shutdown attempt and bounded join have already run when the
    ///   error is returned.
    pub async fn run(&mut self) -> Result<SessionReport, SessionError> {
        let started = Instant::now();
        info!(
            session_id = %self.session_id,
            host = %self.config.host,
            port = self.config.port,
            "starting scan session"
        );

        let argv = match build_command(&self.config) {
            Ok(argv) => argv,
            Err(e) => {
                warn!(session_id = %self.session_id, "daemon was never launched, shutdown skipped");
                self.record_outcome(started, "aborted");
                return Err(e.into());
            }
        };

        let mut handle = match ProcessLauncher::spawn(&self.config, &argv) {
            Ok(handle) => handle,
            Err(e) => {
                warn!(session_id = %self.session_id, "daemon was never launched, shutdown skipped");
                self.record_outcome(started, "aborted");
                return Err(e.into());
            }
        };

        let outcome = self.drive().await;

        // Exactly one shutdown attempt per launched daemon, on every path.
        let shutdown_ok = self.shutdown_daemon().await;
        let daemon_exited = self.join_daemon(&mut handle).await;

        match outcome {
            Ok(evaluation) => {
                let mut result = evaluation.result;
                if !shutdown_ok {
                    warn!(
                        session_id = %self.session_id,
                        prior = %result,
                        "shutdown failure downgrades the session result"
                    );
                    result = SessionResult::Failure;
                }
                self.record_outcome(started, result_label(result));
                info!(
                    session_id = %self.session_id,
                    result = %result,
                    summary = %evaluation.summary,
                    elapsed_secs = started.elapsed().as_secs(),
                    "scan session complete"
                );
                Ok(SessionReport {
                    session_id: self.session_id.to_string(),
                    result,
                    summary: evaluation.summary,
                    scales: evaluation.scales,
                    elapsed_secs: started.elapsed().as_secs(),
                    daemon_exited,
                })
            }
            Err(e) => {
                self.record_outcome(started, "aborted");
                error!(
                    session_id = %self.session_id,
                    error = %e,
                    elapsed_secs = started.elapsed().as_secs(),
                    "scan session aborted"
                );
                Err(e)
            }
        }
    }

    /// Probe, load, aggregate and evaluate -- everything between launch
    /// and cleanup, raced against cancellation.
    async fn drive(&self) -> Result<Evaluation, SessionError> {
        let evaluation = async {
            probe::wait_until_ready(
                &self.config.host,
                self.config.port,
                self.config.connect_timeout,
            )
            .await?;

            if self.config.session_file.is_empty() {
                debug!("no session file configured, evaluating live alert inventory");
            } else {
                info!(path = %self.config.session_file, "loading scan session file");
                self.api.load_session(&self.config.session_file).await?;
            }

            let summary = AlertAggregator::new(Arc::clone(&self.api)).collect().await?;
            let scales = threshold::scales(&summary, &self.policy);
            let result = threshold::evaluate(&summary, &self.policy);
            Ok::<_, SessionError>(Evaluation {
                summary,
                scales,
                result,
            })
        };

        tokio::select! {
            res = evaluation => res,
            () = self.cancel.cancelled() => {
                warn!(session_id = %self.session_id, "cancellation requested, cleaning up daemon");
                Err(SessionError::Cancelled)
            }
        }
    }

    /// The single shutdown call site. Returns whether the call succeeded.
    async fn shutdown_daemon(&self) -> bool {
        info!(session_id = %self.session_id, "shutting down scan daemon");
        match self.api.shutdown().await {
            Ok(()) => true,
            Err(e) => {
                metrics::counter!(m::SHUTDOWN_FAILURES_TOTAL).increment(1);
                error!(
                    session_id = %self.session_id,
                    host = %self.config.host,
                    port = self.config.port,
                    error = %e,
                    "daemon shutdown call failed"
                );
                false
            }
        }
    }

    /// Bounded join on the daemon process; a timeout is reported, never
    /// swallowed.
    async fn join_daemon(&self, handle: &mut ProcessHandle) -> bool {
        match handle.wait_timeout(self.config.join_timeout).await {
            Ok(Some(status)) => {
                info!(session_id = %self.session_id, %status, "daemon process exited");
                true
            }
            Ok(None) => {
                metrics::counter!(m::JOIN_TIMEOUTS_TOTAL).increment(1);
                error!(
                    session_id = %self.session_id,
                    pid = handle.pid(),
                    join_timeout_secs = self.config.join_timeout.as_secs(),
                    "daemon process still running after the join window"
                );
                false
            }
            Err(e) => {
                error!(
                    session_id = %self.session_id,
                    error = %e,
                    "failed waiting on the daemon process"
                );
                false
            }
        }
    }

    fn record_outcome(&self, started: Instant, label: &'static str) {
        metrics::counter!(m::SESSION_RUNS_TOTAL, m::LABEL_RESULT => label).increment(1);
        metrics::histogram!(m::SESSION_DURATION_SECONDS).record(started.elapsed().as_secs_f64());
    }
}

fn result_label(result: SessionResult) -> &'static str {
    match result {
        SessionResult::Success => "success",
        SessionResult::Unstable => "unstable",
        SessionResult::Failure => "failure",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::time::Duration;

    use tokio::net::TcpListener;

    use scangate_core::types::{Alert, Severity};

    use crate::api::MockManagementApi;
    use crate::config::SeverityThreshold;
    use crate::error::{ApiError, LaunchError, ProbeError};
    use scangate_core::error::ConfigError;

    fn permissive_policy() -> ThresholdPolicy {
        ThresholdPolicy {
            high: SeverityThreshold {
                weight: 1,
                soft_limit: 100,
            },
            medium: SeverityThreshold {
                weight: 1,
                soft_limit: 100,
            },
            low: SeverityThreshold {
                weight: 1,
                soft_limit: 100,
            },
            informational: SeverityThreshold {
                weight: 1,
                soft_limit: 100,
            },
            cumulative_soft_limit: 1000,
        }
    }

    /// A child that exits immediately: `sh` rejects the daemon flags and
    /// quits, which keeps the bounded join fast.
    fn test_config(port: u16) -> LaunchConfig {
        LaunchConfig {
            host: "127.0.0.1".to_owned(),
            port,
            install_dir: "/tmp".to_owned(),
            program: "/bin/sh".to_owned(),
            home_dir: String::new(),
            session_file: String::new(),
            extra_args: Vec::new(),
            env_overrides: BTreeMap::new(),
            connect_timeout: Duration::from_secs(5),
            join_timeout: Duration::from_secs(5),
        }
    }

    async fn control_port() -> (TcpListener, u16) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        (listener, port)
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn happy_path_classifies_and_shuts_down_once() {
        let (_listener, port) = control_port().await;
        let api = Arc::new(MockManagementApi::new().with_alerts(vec![
            Alert::new("A", Severity::High),
            Alert::new("A", Severity::Medium),
            Alert::new("B", Severity::Low),
        ]));

        let mut session =
            ScanSession::new(test_config(port), permissive_policy(), Arc::clone(&api));
        let report = session.run().await.unwrap();

        assert_eq!(report.result, SessionResult::Success);
        assert_eq!(report.summary.high, 1);
        assert_eq!(report.summary.low, 1);
        assert_eq!(report.summary.medium, 0);
        assert!(report.daemon_exited);
        assert_eq!(api.shutdown_calls(), 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn session_file_is_loaded_before_evaluation() {
        let (_listener, port) = control_port().await;
        let api = Arc::new(MockManagementApi::new());
        let mut config = test_config(port);
        config.session_file = "/workspace/scan.session".to_owned();

        let mut session = ScanSession::new(config, permissive_policy(), Arc::clone(&api));
        session.run().await.unwrap();

        assert_eq!(api.loaded_sessions(), vec!["/workspace/scan.session"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn api_error_still_shuts_down_exactly_once() {
        let (_listener, port) = control_port().await;
        let api = Arc::new(MockManagementApi::new().with_failing_alerts());

        let mut session =
            ScanSession::new(test_config(port), permissive_policy(), Arc::clone(&api));
        let err = session.run().await.unwrap_err();

        assert!(matches!(err, SessionError::Api(ApiError::Request { .. })));
        assert_eq!(api.shutdown_calls(), 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn shutdown_failure_downgrades_success_to_failure() {
        let (_listener, port) = control_port().await;
        let api = Arc::new(MockManagementApi::new().with_failing_shutdown());

        let mut session =
            ScanSession::new(test_config(port), permissive_policy(), Arc::clone(&api));
        let report = session.run().await.unwrap();

        // Zero alerts would have been a clean success.
        assert!(report.summary.is_empty());
        assert_eq!(report.result, SessionResult::Failure);
        assert_eq!(api.shutdown_calls(), 1);
    }

    #[tokio::test]
    async fn config_error_aborts_before_launch() {
        let api = Arc::new(MockManagementApi::new());
        let mut config = test_config(1);
        config.install_dir = String::new();

        let mut session = ScanSession::new(config, permissive_policy(), Arc::clone(&api));
        let err = session.run().await.unwrap_err();

        assert!(matches!(
            err,
            SessionError::Config(ConfigError::MissingInstallDir)
        ));
        assert_eq!(api.shutdown_calls(), 0);
    }

    #[tokio::test]
    async fn launch_error_skips_shutdown() {
        let api = Arc::new(MockManagementApi::new());
        let mut config = test_config(1);
        config.program = "/nonexistent/scand.sh".to_owned();

        let mut session = ScanSession::new(config, permissive_policy(), Arc::clone(&api));
        let err = session.run().await.unwrap_err();

        assert!(matches!(
            err,
            SessionError::Launch(LaunchError::SpawnFailed { .. })
        ));
        assert_eq!(api.shutdown_calls(), 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn probe_timeout_still_attempts_shutdown() {
        // Reserve a port and release it so connects are refused.
        let (listener, port) = control_port().await;
        drop(listener);

        let api = Arc::new(MockManagementApi::new());
        let mut config = test_config(port);
        config.connect_timeout = Duration::from_secs(1);

        let mut session = ScanSession::new(config, permissive_policy(), Arc::clone(&api));
        let err = session.run().await.unwrap_err();

        assert!(matches!(
            err,
            SessionError::Probe(ProbeError::ConnectTimeout { .. })
        ));
        assert_eq!(api.shutdown_calls(), 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn cancellation_cleans_up_and_reports_cancelled() {
        let (_listener, port) = control_port().await;
        let api = Arc::new(MockManagementApi::new());

        let mut session =
            ScanSession::new(test_config(port), permissive_policy(), Arc::clone(&api));
        session.cancellation_token().cancel();
        let err = session.run().await.unwrap_err();

        assert!(matches!(err, SessionError::Cancelled));
        assert_eq!(api.shutdown_calls(), 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn strict_policy_fails_on_single_high_alert() {
        let (_listener, port) = control_port().await;
        let api = Arc::new(
            MockManagementApi::new().with_alerts(vec![Alert::new("A", Severity::High)]),
        );

        let mut policy = permissive_policy();
        policy.high.soft_limit = 0;

        let mut session = ScanSession::new(test_config(port), policy, Arc::clone(&api));
        let report = session.run().await.unwrap();
        assert_eq!(report.result, SessionResult::Failure);
    }
}
