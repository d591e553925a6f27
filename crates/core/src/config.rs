//! Configuration management -- `scangate.toml` parsing and runtime settings.
//!
//! [`ScangateConfig`] is the top-level structure covering the whole
//! workspace. Loading order:
//! 1. TOML file (`scangate.toml`)
//! 2. Environment variable overrides (`SCANGATE_{SECTION}_{FIELD}`)
//! 3. Validation
//!
//! CLI arguments (highest precedence) are applied by the binary after
//! loading.
//!
//! # Example
//! ```no_run
//! # async fn example() -> Result<(), scangate_core::error::ScangateError> {
//! use scangate_core::config::ScangateConfig;
//!
//! // Load from file and apply env overrides
//! let config = ScangateConfig::load("scangate.toml").await?;
//!
//! // Parse directly from a TOML string
//! let config = ScangateConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, ScangateError};

/// Scangate unified configuration.
///
/// Top-level structure of the `scangate.toml` file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScangateConfig {
    /// General settings (logging).
    #[serde(default)]
    pub general: GeneralConfig,
    /// Scan daemon settings (launch, connection, session).
    #[serde(default)]
    pub daemon: DaemonConfig,
    /// Threshold policy settings.
    #[serde(default)]
    pub thresholds: ThresholdsConfig,
}

impl ScangateConfig {
    /// Loads configuration from a TOML file and applies env overrides.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ScangateError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file (no env overrides).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, ScangateError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ScangateError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                ScangateError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parses configuration from a TOML string.
    pub fn parse(toml_str: &str) -> Result<Self, ScangateError> {
        toml::from_str(toml_str).map_err(|e| {
            ScangateError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// Overrides configuration values from environment variables.
    ///
    /// Naming convention: `SCANGATE_{SECTION}_{FIELD}`,
    /// e.g. `SCANGATE_DAEMON_HOST=10.0.0.4`.
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "SCANGATE_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "SCANGATE_GENERAL_LOG_FORMAT");

        // Daemon
        override_string(&mut self.daemon.host, "SCANGATE_DAEMON_HOST");
        override_u16(&mut self.daemon.port, "SCANGATE_DAEMON_PORT");
        override_string(&mut self.daemon.install_dir, "SCANGATE_DAEMON_INSTALL_DIR");
        override_string(&mut self.daemon.home_dir, "SCANGATE_DAEMON_HOME_DIR");
        override_string(&mut self.daemon.session_file, "SCANGATE_DAEMON_SESSION_FILE");
        override_u64(
            &mut self.daemon.connect_timeout_secs,
            "SCANGATE_DAEMON_CONNECT_TIMEOUT_SECS",
        );
        override_u64(
            &mut self.daemon.join_timeout_secs,
            "SCANGATE_DAEMON_JOIN_TIMEOUT_SECS",
        );

        // Thresholds
        override_i64(&mut self.thresholds.high_weight, "SCANGATE_THRESHOLDS_HIGH_WEIGHT");
        override_i64(
            &mut self.thresholds.high_soft_limit,
            "SCANGATE_THRESHOLDS_HIGH_SOFT_LIMIT",
        );
        override_i64(
            &mut self.thresholds.medium_weight,
            "SCANGATE_THRESHOLDS_MEDIUM_WEIGHT",
        );
        override_i64(
            &mut self.thresholds.medium_soft_limit,
            "SCANGATE_THRESHOLDS_MEDIUM_SOFT_LIMIT",
        );
        override_i64(&mut self.thresholds.low_weight, "SCANGATE_THRESHOLDS_LOW_WEIGHT");
        override_i64(
            &mut self.thresholds.low_soft_limit,
            "SCANGATE_THRESHOLDS_LOW_SOFT_LIMIT",
        );
        override_i64(&mut self.thresholds.info_weight, "SCANGATE_THRESHOLDS_INFO_WEIGHT");
        override_i64(
            &mut self.thresholds.info_soft_limit,
            "SCANGATE_THRESHOLDS_INFO_SOFT_LIMIT",
        );
        override_i64(
            &mut self.thresholds.cumulative_soft_limit,
            "SCANGATE_THRESHOLDS_CUMULATIVE_SOFT_LIMIT",
        );
    }

    /// Validates configuration values.
    ///
    /// The install directory is deliberately *not* validated here: it is
    /// checked by the command builder immediately before launch, so that a
    /// config file can be validated on a machine where the daemon is not
    /// installed.
    pub fn validate(&self) -> Result<(), ScangateError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        if self.daemon.host.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "daemon.host".to_owned(),
                reason: "host must not be empty".to_owned(),
            }
            .into());
        }

        if self.daemon.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "daemon.port".to_owned(),
                reason: "port must be in 1-65535".to_owned(),
            }
            .into());
        }

        if self.daemon.connect_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "daemon.connect_timeout_secs".to_owned(),
                reason: "connect timeout must be at least 1 second".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Log format (json, pretty).
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
        }
    }
}

/// Scan daemon settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// Host the daemon binds its control port to.
    pub host: String,
    /// Control port (1-65535).
    pub port: u16,
    /// Daemon install directory (also the spawn working directory).
    ///
    /// Usually injected by the build system; may stay empty until launch.
    pub install_dir: String,
    /// Daemon home directory (`-dir`). Omitted from the command line when
    /// empty.
    pub home_dir: String,
    /// Pre-built session file loaded before alert evaluation.
    pub session_file: String,
    /// Overall readiness-probe budget in seconds.
    pub connect_timeout_secs: u64,
    /// Bounded-join ceiling after shutdown, in seconds.
    pub join_timeout_secs: u64,
    /// Extra command-line option/value pairs, appended in order.
    pub extra_args: Vec<ExtraArg>,
    /// Environment overrides applied on top of the inherited build
    /// environment (override wins on key collision).
    pub env: BTreeMap<String, String>,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8090,
            install_dir: String::new(),
            home_dir: String::new(),
            session_file: String::new(),
            connect_timeout_secs: 60,
            join_timeout_secs: 3600,
            extra_args: Vec::new(),
            env: BTreeMap::new(),
        }
    }
}

/// One extra command-line option/value pair.
///
/// Either side may be empty; an empty side contributes no token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtraArg {
    pub option: String,
    pub value: String,
}

/// Threshold policy settings.
///
/// Weights scale one distinct alert of the given severity; soft limits are
/// strict ceilings on the resulting scale. Defaults are maximally strict:
/// with weight 1 and soft limit 0, any distinct alert trips its gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdsConfig {
    pub high_weight: i64,
    pub high_soft_limit: i64,
    pub medium_weight: i64,
    pub medium_soft_limit: i64,
    pub low_weight: i64,
    pub low_soft_limit: i64,
    pub info_weight: i64,
    pub info_soft_limit: i64,
    /// Ceiling on the sum of all four scales.
    pub cumulative_soft_limit: i64,
}

impl Default for ThresholdsConfig {
    fn default() -> Self {
        Self {
            high_weight: 1,
            high_soft_limit: 0,
            medium_weight: 1,
            medium_soft_limit: 0,
            low_weight: 1,
            low_soft_limit: 0,
            info_weight: 1,
            info_soft_limit: 0,
            cumulative_soft_limit: 0,
        }
    }
}

// --- env override helpers ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_u16(target: &mut u16, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u16>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u16 from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}

fn override_i64(target: &mut i64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<i64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse i64 from env var, ignoring"
            ),
        }
    }
}
