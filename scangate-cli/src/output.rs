//! Output formatting abstraction for text vs JSON rendering.
//!
//! All subcommand output flows through [`OutputWriter`], which handles
//! format switching and keeps format-specific logic out of command
//! handlers.

use std::io::Write;

use colored::Colorize;
use serde::Serialize;

use scangate_core::types::SessionResult;
use scangate_session::SessionReport;

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Abstraction for writing CLI output in different formats.
pub struct OutputWriter {
    format: OutputFormat,
}

impl OutputWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Render a payload to stdout.
    ///
    /// For `Text` format, delegates to `Render::render_text()`.
    /// For `Json` format, serialises via `serde_json`.
    pub fn render<T: Render + Serialize>(&self, payload: &T) -> Result<(), CliError> {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        match self.format {
            OutputFormat::Text => {
                payload.render_text(&mut handle)?;
            }
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut handle, payload)?;
                writeln!(handle)?;
            }
        }
        Ok(())
    }
}

/// Trait for human-readable text rendering.
///
/// Implemented by every CLI output payload alongside `serde::Serialize`.
pub trait Render {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()>;
}

/// `scangate run` output payload.
#[derive(Debug, Serialize)]
pub struct RunReport {
    /// Final verdict string (SUCCESS / UNSTABLE / FAILURE).
    pub verdict: String,
    /// The full session report.
    #[serde(flatten)]
    pub report: SessionReport,
}

impl From<SessionReport> for RunReport {
    fn from(report: SessionReport) -> Self {
        Self {
            verdict: report.result.to_string(),
            report,
        }
    }
}

impl Render for RunReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "Scan Session Report")?;
        writeln!(w, "{}", "-".repeat(52))?;
        writeln!(w, "Session:  {}", self.report.session_id)?;
        writeln!(w)?;
        writeln!(w, "{:<16} {:>10} {:>10}", "Severity", "Distinct", "Scale")?;
        writeln!(
            w,
            "{:<16} {:>10} {:>10}",
            "High", self.report.summary.high, self.report.scales.high
        )?;
        writeln!(
            w,
            "{:<16} {:>10} {:>10}",
            "Medium", self.report.summary.medium, self.report.scales.medium
        )?;
        writeln!(
            w,
            "{:<16} {:>10} {:>10}",
            "Low", self.report.summary.low, self.report.scales.low
        )?;
        writeln!(
            w,
            "{:<16} {:>10} {:>10}",
            "Informational", self.report.summary.informational, self.report.scales.informational
        )?;
        writeln!(w)?;
        if !self.report.daemon_exited {
            writeln!(
                w,
                "{}",
                "warning: daemon still running after the join window".yellow()
            )?;
        }
        let verdict = match self.report.result {
            SessionResult::Success => "SUCCESS".green().bold(),
            SessionResult::Unstable => "UNSTABLE".yellow().bold(),
            SessionResult::Failure => "FAILURE".red().bold(),
        };
        writeln!(w, "Verdict:  {verdict} ({}s)", self.report.elapsed_secs)?;
        Ok(())
    }
}
