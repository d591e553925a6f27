//! `scangate run` command handler.
//!
//! Runs one full scan session and renders the report. The verdict maps
//! to the exit code in `main`; infrastructure failures surface as
//! [`CliError::Aborted`] after the session has already cleaned up the
//! daemon.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use scangate_core::config::ScangateConfig;
use scangate_core::types::SessionResult;
use scangate_session::{
    HttpManagementApi, LaunchConfig, ScanSession, ThresholdPolicy, resolve_program_path,
};

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::logging;
use crate::output::{OutputWriter, RunReport};

/// Execute the `run` command.
///
/// Loads configuration, applies CLI overrides, wires Ctrl-C to the
/// session's cancellation token, and runs the session to completion.
/// A cancelled or aborted session has already attempted daemon shutdown
/// when this returns.
pub async fn execute(
    args: RunArgs,
    config_path: &Path,
    log_level: Option<&str>,
    writer: &OutputWriter,
) -> Result<SessionResult, CliError> {
    let mut config = ScangateConfig::load(config_path)
        .await
        .map_err(|e| CliError::Config(e.to_string()))?;
    apply_overrides(&mut config, &args, log_level);
    config
        .validate()
        .map_err(|e| CliError::Config(e.to_string()))?;

    logging::init_tracing(&config.general)?;
    info!(config = %config_path.display(), "scangate run starting");

    let program = args
        .program
        .unwrap_or_else(|| resolve_program_path(&config.daemon.install_dir));
    let launch = LaunchConfig::from_core(&config.daemon, program);
    let policy = ThresholdPolicy::from_core(&config.thresholds);
    let api = Arc::new(
        HttpManagementApi::new(&config.daemon.host, config.daemon.port)
            .map_err(|e| CliError::Aborted(e.to_string()))?,
    );

    let mut session = ScanSession::new(launch, policy, api);

    // Best-effort cancellation: the daemon is still shut down before the
    // gate exits with the aborted code.
    let cancel = session.cancellation_token();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, cancelling scan session");
            cancel.cancel();
        }
    });

    let outcome = session.run().await;
    interrupt.abort();

    let report = outcome.map_err(CliError::from)?;
    let result = report.result;
    writer.render(&RunReport::from(report))?;
    Ok(result)
}

/// CLI arguments take precedence over config file and env overrides.
fn apply_overrides(config: &mut ScangateConfig, args: &RunArgs, log_level: Option<&str>) {
    if let Some(level) = log_level {
        config.general.log_level = level.to_owned();
    }
    if let Some(install_dir) = &args.install_dir {
        config.daemon.install_dir = install_dir.clone();
    }
    if let Some(host) = &args.host {
        config.daemon.host = host.clone();
    }
    if let Some(port) = args.port {
        config.daemon.port = port;
    }
    if let Some(session_file) = &args.session_file {
        config.daemon.session_file = session_file.clone();
    }
}
