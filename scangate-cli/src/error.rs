//! CLI-specific error types and exit code mapping.

use scangate_core::error::ScangateError;
use scangate_session::SessionError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-facing message; the
/// `exit_code()` method maps errors to the gate's exit-code contract.
/// Policy verdicts (`Failure`, `Unstable`) are *not* errors -- they map to
/// exit codes in `main` from the successful session report.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// Infrastructure failure: the session aborted before producing a
    /// verdict (launch, readiness, management API, cancellation).
    #[error("session aborted: {0}")]
    Aborted(String),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from scangate-core.
    #[error("{0}")]
    Core(#[from] ScangateError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                                  |
    /// |------|------------------------------------------|
    /// | 0    | Success verdict                          |
    /// | 1    | General / command error                  |
    /// | 2    | Configuration error                      |
    /// | 3    | Session aborted (infrastructure failure) |
    /// | 4    | Failure verdict (threshold policy)       |
    /// | 5    | Unstable verdict (threshold policy)      |
    /// | 10   | IO error                                 |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Core(_) => 2,
            Self::Aborted(_) => 3,
            Self::Io(_) => 10,
            Self::JsonSerialize(_) | Self::Command(_) => 1,
        }
    }
}

impl From<SessionError> for CliError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::Config(c) => Self::Config(c.to_string()),
            other => Self::Aborted(other.to_string()),
        }
    }
}
