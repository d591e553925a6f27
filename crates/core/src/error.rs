//! Error types shared across the workspace.

/// Scangate top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum ScangateError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration errors.
///
/// All variants are fatal before any daemon is launched; nothing needs
/// cleanup when one of these is returned.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file not found.
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// Configuration could not be parsed.
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// A configuration value is invalid.
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    /// The daemon install directory is missing or empty.
    ///
    /// Checked immediately before command construction, never later: no
    /// process may be spawned from an unresolved install directory.
    #[error("daemon install directory is missing or empty")]
    MissingInstallDir,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::InvalidValue {
            field: "daemon.port".to_owned(),
            reason: "must be non-zero".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("daemon.port"));
        assert!(msg.contains("must be non-zero"));
    }

    #[test]
    fn missing_install_dir_display() {
        let msg = ConfigError::MissingInstallDir.to_string();
        assert!(msg.contains("install directory"));
    }

    #[test]
    fn top_level_wraps_config_error() {
        let err: ScangateError = ConfigError::FileNotFound {
            path: "scangate.toml".to_owned(),
        }
        .into();
        assert!(matches!(err, ScangateError::Config(_)));
        assert!(err.to_string().contains("scangate.toml"));
    }
}
