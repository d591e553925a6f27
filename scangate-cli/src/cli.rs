//! CLI argument parsing using clap derive API.
//!
//! Purely declarative; no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Scangate -- scan-daemon session gate for CI pipelines.
///
/// Use `scangate <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "scangate", version, about, long_about = None)]
pub struct Cli {
    /// Path to the scangate.toml configuration file.
    #[arg(short, long, default_value = "scangate.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one full scan session and gate on the verdict.
    Run(RunArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- run ----

/// Run one scan session: launch the daemon, wait for readiness, load the
/// session file, evaluate thresholds, shut the daemon down.
///
/// Exit codes: 0 success, 4 failure verdict, 5 unstable verdict,
/// 3 aborted (infrastructure), 2 configuration error.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Override the daemon install directory.
    #[arg(long)]
    pub install_dir: Option<String>,

    /// Override the daemon host.
    #[arg(long)]
    pub host: Option<String>,

    /// Override the daemon control port.
    #[arg(long)]
    pub port: Option<u16>,

    /// Override the session file to load before evaluation.
    #[arg(long)]
    pub session_file: Option<String>,

    /// Use a pre-resolved daemon executable path instead of deriving it
    /// from the install directory.
    #[arg(long)]
    pub program: Option<String>,
}

// ---- config ----

/// Manage scangate configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, daemon, thresholds).
        #[arg(long)]
        section: Option<String>,
    },
}
