//! Session domain error types.
//!
//! Each phase of the session lifecycle has its own error enum so callers
//! can branch on the kind without inspecting messages. [`SessionError`]
//! is the umbrella the orchestrator propagates; the CLI surfaces any of
//! these as an aborted build, distinct from a policy-driven `Failure`.

use scangate_core::error::ConfigError;

/// Daemon process could not be started.
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    /// Spawn failed (missing binary, permission denied, node unreachable).
    #[error("failed to spawn daemon '{program}': {reason}")]
    SpawnFailed {
        /// Resolved executable path.
        program: String,
        /// OS-level failure reason.
        reason: String,
    },
}

/// Readiness probe errors.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// The daemon control port never became reachable within the budget.
    ///
    /// Raised both when a single connect attempt times out at the socket
    /// level (treated as fatal misconfiguration, no retry) and when the
    /// cumulative budget runs out across refused attempts.
    #[error("unable to connect to daemon at {host}:{port} after {timeout_secs} seconds")]
    ConnectTimeout {
        /// Probed host.
        host: String,
        /// Probed control port.
        port: u16,
        /// Configured overall budget in seconds.
        timeout_secs: u64,
    },
}

/// Remote management API errors.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Transport-level request failure.
    #[error("request to {endpoint} failed: {reason}")]
    Request {
        /// Endpoint path.
        endpoint: String,
        /// Failure reason.
        reason: String,
    },

    /// The daemon answered with a non-success status.
    #[error("{endpoint} returned status {status}")]
    Status {
        /// Endpoint path.
        endpoint: String,
        /// HTTP status code.
        status: u16,
    },

    /// The response body could not be interpreted.
    ///
    /// Covers undecodable bodies as well as alert records missing the
    /// `alert` or `risk` field, or carrying an unknown `risk` value.
    #[error("malformed response from {endpoint}: {reason}")]
    Malformed {
        /// Endpoint path.
        endpoint: String,
        /// What was wrong with the body.
        reason: String,
    },
}

/// Umbrella error for one scan session.
///
/// A shutdown failure is deliberately absent: it never propagates as an
/// error, it is logged and downgrades the session result instead.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Configuration error (pre-launch, nothing to clean up).
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Daemon could not be launched (shutdown skipped).
    #[error("launch error: {0}")]
    Launch(#[from] LaunchError),

    /// Daemon never became reachable (shutdown still attempted).
    #[error("probe error: {0}")]
    Probe(#[from] ProbeError),

    /// Management API call failed (shutdown still attempted).
    #[error("api error: {0}")]
    Api(#[from] ApiError),

    /// The session was cancelled before evaluation completed.
    #[error("session cancelled before evaluation completed")]
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launch_error_display() {
        let err = LaunchError::SpawnFailed {
            program: "/opt/scand/scand.sh".to_owned(),
            reason: "No such file or directory".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/opt/scand/scand.sh"));
        assert!(msg.contains("No such file"));
    }

    #[test]
    fn connect_timeout_display_has_context() {
        let err = ProbeError::ConnectTimeout {
            host: "127.0.0.1".to_owned(),
            port: 8090,
            timeout_secs: 60,
        };
        let msg = err.to_string();
        assert!(msg.contains("127.0.0.1:8090"));
        assert!(msg.contains("60 seconds"));
    }

    #[test]
    fn api_error_display() {
        let err = ApiError::Malformed {
            endpoint: "/api/v1/alerts".to_owned(),
            reason: "record missing 'risk' field".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/api/v1/alerts"));
        assert!(msg.contains("'risk'"));
    }

    #[test]
    fn session_error_wraps_phase_errors() {
        let err: SessionError = ProbeError::ConnectTimeout {
            host: "h".to_owned(),
            port: 1,
            timeout_secs: 5,
        }
        .into();
        assert!(matches!(err, SessionError::Probe(_)));

        let err: SessionError = ApiError::Status {
            endpoint: "/api/v1/shutdown".to_owned(),
            status: 500,
        }
        .into();
        assert!(matches!(err, SessionError::Api(_)));
    }

    #[test]
    fn session_error_wraps_config_error() {
        let err: SessionError = ConfigError::MissingInstallDir.into();
        assert!(matches!(err, SessionError::Config(_)));
    }
}
