//! `scangate config` command handler.

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use scangate_core::config::ScangateConfig;

use crate::cli::{ConfigAction, ConfigArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `config` command.
pub async fn execute(
    args: ConfigArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Validate => execute_validate(config_path, writer).await,
        ConfigAction::Show { section } => execute_show(config_path, section, writer).await,
    }
}

/// Validate the configuration file and report errors.
///
/// The install directory is reported as a warning rather than an error:
/// it is often injected by the build system only at launch time.
async fn execute_validate(config_path: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    info!(path = %config_path.display(), "validating configuration");

    let (valid, warnings, errors) = match ScangateConfig::load(config_path).await {
        Ok(config) => {
            let mut warnings = Vec::new();
            if config.daemon.install_dir.trim().is_empty() {
                warnings.push(
                    "daemon.install_dir is empty; `scangate run` will fail at launch unless it is \
                     provided"
                        .to_owned(),
                );
            }
            (true, warnings, Vec::new())
        }
        Err(e) => (false, Vec::new(), vec![e.to_string()]),
    };

    let report = ConfigValidationReport {
        source: config_path.display().to_string(),
        valid,
        warnings,
        errors,
    };
    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Config("configuration is invalid".to_owned()));
    }
    Ok(())
}

/// Show the effective configuration (file + env overrides + defaults).
async fn execute_show(
    config_path: &Path,
    section: Option<String>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    info!(path = %config_path.display(), "loading configuration");

    let config = ScangateConfig::load(config_path)
        .await
        .map_err(|e| CliError::Config(e.to_string()))?;

    let config_toml = match section.as_deref() {
        None => toml::to_string_pretty(&config)
            .unwrap_or_else(|e| format!("(serialization error: {e})")),
        Some("general") => toml::to_string_pretty(&config.general)
            .unwrap_or_else(|e| format!("(serialization error: {e})")),
        Some("daemon") => toml::to_string_pretty(&config.daemon)
            .unwrap_or_else(|e| format!("(serialization error: {e})")),
        Some("thresholds") => toml::to_string_pretty(&config.thresholds)
            .unwrap_or_else(|e| format!("(serialization error: {e})")),
        Some(other) => {
            return Err(CliError::Command(format!(
                "unknown section '{other}', expected one of: general, daemon, thresholds"
            )));
        }
    };

    writer.render(&ConfigReport {
        source: config_path.display().to_string(),
        section,
        config_toml,
    })?;
    Ok(())
}

/// `config validate` output payload.
#[derive(Debug, Serialize)]
struct ConfigValidationReport {
    source: String,
    valid: bool,
    warnings: Vec<String>,
    errors: Vec<String>,
}

impl Render for ConfigValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "Configuration: {}", self.source)?;
        if self.valid {
            writeln!(w, "Status: valid")?;
        } else {
            writeln!(w, "Status: INVALID")?;
        }
        for warning in &self.warnings {
            writeln!(w, "warning: {warning}")?;
        }
        for error in &self.errors {
            writeln!(w, "error: {error}")?;
        }
        Ok(())
    }
}

/// `config show` output payload.
#[derive(Debug, Serialize)]
struct ConfigReport {
    source: String,
    section: Option<String>,
    config_toml: String,
}

impl Render for ConfigReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "# source: {}", self.source)?;
        if let Some(section) = &self.section {
            writeln!(w, "# section: {section}")?;
        }
        writeln!(w, "{}", self.config_toml)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use std::io::Write as _;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(content.as_bytes()).expect("write config");
        file
    }

    #[tokio::test]
    async fn validate_accepts_valid_config() {
        let file = write_config("[daemon]\ninstall_dir = \"/opt/scand\"\n");
        let writer = OutputWriter::new(OutputFormat::Json);
        execute_validate(file.path(), &writer).await.unwrap();
    }

    #[tokio::test]
    async fn validate_rejects_broken_toml() {
        let file = write_config("daemon = [[[");
        let writer = OutputWriter::new(OutputFormat::Json);
        let err = execute_validate(file.path(), &writer).await.unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[tokio::test]
    async fn validate_rejects_invalid_values() {
        let file = write_config("[daemon]\nport = 0\n");
        let writer = OutputWriter::new(OutputFormat::Json);
        let err = execute_validate(file.path(), &writer).await.unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[tokio::test]
    async fn show_renders_full_config() {
        let file = write_config("[general]\nlog_level = \"debug\"\n");
        let writer = OutputWriter::new(OutputFormat::Json);
        execute_show(file.path(), None, &writer).await.unwrap();
    }

    #[tokio::test]
    async fn show_rejects_unknown_section() {
        let file = write_config("");
        let writer = OutputWriter::new(OutputFormat::Json);
        let err = execute_show(file.path(), Some("nope".to_owned()), &writer)
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::Command(_)));
    }

    #[test]
    fn validation_report_text_lists_warnings() {
        let report = ConfigValidationReport {
            source: "scangate.toml".to_owned(),
            valid: true,
            warnings: vec!["daemon.install_dir is empty".to_owned()],
            errors: Vec::new(),
        };
        let mut buffer = Vec::new();
        report.render_text(&mut buffer).unwrap();
        let output = String::from_utf8(buffer).unwrap();
        assert!(output.contains("valid"));
        assert!(output.contains("warning: daemon.install_dir"));
    }
}
