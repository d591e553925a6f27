//! Daemon process launching and bounded joining.
//!
//! [`ProcessLauncher::spawn`] starts the daemon as a child process with
//! the build environment plus configured overrides, working directory set
//! to the install dir, and stdout/stderr forwarded line-by-line to the
//! session's log sink. The returned [`ProcessHandle`] supports
//! "wait up to D, else report still-running" joins.

use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::config::LaunchConfig;
use crate::error::LaunchError;

const PROG_NAME_SH: &str = "scand.sh";
const PROG_NAME_BAT: &str = "scand.bat";

/// Resolves the daemon executable path for the local node.
///
/// Joins the install directory with the platform program name:
/// `/scand.sh` on unix-style nodes, `\scand.bat` otherwise. Callers on
/// remote or cross-platform nodes resolve the path themselves and pass it
/// through [`LaunchConfig::program`] verbatim.
pub fn resolve_program_path(install_dir: &str) -> String {
    if cfg!(windows) {
        format!("{install_dir}\\{PROG_NAME_BAT}")
    } else {
        format!("{install_dir}/{PROG_NAME_SH}")
    }
}

/// Handle to a spawned daemon process.
#[derive(Debug)]
pub struct ProcessHandle {
    child: Child,
    pid: Option<u32>,
}

impl ProcessHandle {
    /// OS process id, if the child is still attached.
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Waits for the child to exit, up to `limit`.
    ///
    /// Returns `Ok(Some(status))` when the child exited within the
    /// window and `Ok(None)` when it is still running -- a join timeout is
    /// the caller's to report, never an error here.
    pub async fn wait_timeout(
        &mut self,
        limit: std::time::Duration,
    ) -> Result<Option<std::process::ExitStatus>, std::io::Error> {
        match tokio::time::timeout(limit, self.child.wait()).await {
            Ok(status) => status.map(Some),
            Err(_) => Ok(None),
        }
    }
}

/// Spawns the scan daemon.
pub struct ProcessLauncher;

impl ProcessLauncher {
    /// Starts the daemon child process.
    ///
    /// The command vector comes from
    /// [`build_command`](crate::command::build_command); spawning is
    /// non-blocking with respect to daemon readiness -- callers probe the
    /// control port separately. The child inherits the build environment;
    /// configured overrides are applied on top and win on key collision.
    ///
    /// # Errors
    ///
    /// Returns [`LaunchError::SpawnFailed`] when the executable cannot be
    /// started.
    pub fn spawn(config: &LaunchConfig, argv: &[String]) -> Result<ProcessHandle, LaunchError> {
        let (program, args) = argv.split_first().ok_or_else(|| LaunchError::SpawnFailed {
            program: String::new(),
            reason: "empty command vector".to_owned(),
        })?;

        let mut child = Command::new(program)
            .args(args)
            .current_dir(&config.install_dir)
            .envs(&config.env_overrides)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| LaunchError::SpawnFailed {
                program: program.clone(),
                reason: e.to_string(),
            })?;

        let pid = child.id();
        info!(pid = pid, program = %program, "scan daemon spawned");

        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(forward_output(stdout, "stdout"));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_output(stderr, "stderr"));
        }

        Ok(ProcessHandle { child, pid })
    }
}

/// Forwards one child output stream to the log sink, line by line.
///
/// Runs until the stream closes (daemon exit). Stream errors end the
/// forwarding task; they do not affect the session.
async fn forward_output(stream: impl AsyncRead + Unpin, channel: &'static str) {
    let mut lines = BufReader::new(stream).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if channel == "stderr" {
                    warn!(target: "scand", "{line}");
                } else {
                    info!(target: "scand", "{line}");
                }
            }
            Ok(None) => break,
            Err(e) => {
                debug!(channel, error = %e, "daemon output stream closed with error");
                break;
            }
        }
    }
}
