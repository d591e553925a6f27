//! Daemon command-line construction.
//!
//! Produces the exact argument vector the daemon is spawned with. Order
//! is significant:
//!
//! ```text
//! <program> -daemon -host <host> -port <port> -config api.key=<key>
//!           [-dir <home-dir>] [<extra option/value tokens>...]
//! ```

use scangate_core::error::ConfigError;

use crate::config::LaunchConfig;

/// Fixed control-API key passed to the daemon and sent on every request.
pub const API_KEY: &str = "SCANGATE-PIPELINE";

const CMD_LINE_DAEMON: &str = "-daemon";
const CMD_LINE_HOST: &str = "-host";
const CMD_LINE_PORT: &str = "-port";
const CMD_LINE_CONFIG: &str = "-config";
const CMD_LINE_DIR: &str = "-dir";
const CMD_LINE_API_KEY: &str = "api.key";

/// Builds the daemon argument vector from a launch configuration.
///
/// The install directory is validated here, before any spawn is
/// attempted; the resolved program path is accepted verbatim. `-dir` is
/// emitted only for a non-empty home directory. Each extra pair
/// contributes its option token only if non-empty, then its value token
/// only if non-empty, so a pair may add 0, 1 or 2 tokens.
///
/// # Errors
///
/// Returns [`ConfigError::MissingInstallDir`] when the install directory
/// is empty.
pub fn build_command(config: &LaunchConfig) -> Result<Vec<String>, ConfigError> {
    if config.install_dir.trim().is_empty() {
        return Err(ConfigError::MissingInstallDir);
    }

    let mut cmd = Vec::with_capacity(10 + config.extra_args.len() * 2);
    cmd.push(config.program.clone());
    cmd.push(CMD_LINE_DAEMON.to_owned());
    cmd.push(CMD_LINE_HOST.to_owned());
    cmd.push(config.host.clone());
    cmd.push(CMD_LINE_PORT.to_owned());
    cmd.push(config.port.to_string());
    cmd.push(CMD_LINE_CONFIG.to_owned());
    cmd.push(format!("{CMD_LINE_API_KEY}={API_KEY}"));

    if !config.home_dir.is_empty() {
        cmd.push(CMD_LINE_DIR.to_owned());
        cmd.push(config.home_dir.clone());
    }

    for arg in &config.extra_args {
        if !arg.option.is_empty() {
            cmd.push(arg.option.clone());
        }
        if !arg.value.is_empty() {
            cmd.push(arg.value.clone());
        }
    }

    Ok(cmd)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scangate_core::config::ExtraArg;
    use std::collections::BTreeMap;
    use std::time::Duration;

    fn sample_config() -> LaunchConfig {
        LaunchConfig {
            host: "127.0.0.1".to_owned(),
            port: 8090,
            install_dir: "/opt/scand".to_owned(),
            program: "/opt/scand/scand.sh".to_owned(),
            home_dir: String::new(),
            session_file: String::new(),
            extra_args: Vec::new(),
            env_overrides: BTreeMap::new(),
            connect_timeout: Duration::from_secs(60),
            join_timeout: Duration::from_secs(3600),
        }
    }

    #[test]
    fn command_starts_with_fixed_prefix() {
        let cmd = build_command(&sample_config()).unwrap();
        assert_eq!(
            cmd,
            vec![
                "/opt/scand/scand.sh",
                "-daemon",
                "-host",
                "127.0.0.1",
                "-port",
                "8090",
                "-config",
                "api.key=SCANGATE-PIPELINE",
            ]
        );
    }

    #[test]
    fn dir_flag_present_iff_home_dir_non_empty() {
        let mut config = sample_config();
        let cmd = build_command(&config).unwrap();
        assert!(!cmd.contains(&"-dir".to_owned()));

        config.home_dir = "/var/lib/scand".to_owned();
        let cmd = build_command(&config).unwrap();
        let dir_pos = cmd.iter().position(|t| t == "-dir").unwrap();
        assert_eq!(cmd[dir_pos + 1], "/var/lib/scand");
        // -dir comes after the fixed prefix
        assert_eq!(dir_pos, 8);
    }

    #[test]
    fn extra_pairs_flattened_in_order() {
        let mut config = sample_config();
        config.extra_args = vec![
            ExtraArg {
                option: "-newsession".to_owned(),
                value: "ci".to_owned(),
            },
            ExtraArg {
                option: "-nostdout".to_owned(),
                value: String::new(),
            },
        ];
        let cmd = build_command(&config).unwrap();
        assert_eq!(
            &cmd[8..],
            &[
                "-newsession".to_owned(),
                "ci".to_owned(),
                "-nostdout".to_owned()
            ]
        );
    }

    #[test]
    fn extra_pair_contributes_zero_one_or_two_tokens() {
        let mut config = sample_config();
        config.extra_args = vec![
            // empty pair: 0 tokens
            ExtraArg::default(),
            // value only: 1 token
            ExtraArg {
                option: String::new(),
                value: "orphan-value".to_owned(),
            },
            // full pair: 2 tokens
            ExtraArg {
                option: "-opt".to_owned(),
                value: "val".to_owned(),
            },
        ];
        let cmd = build_command(&config).unwrap();
        assert_eq!(
            &cmd[8..],
            &["orphan-value".to_owned(), "-opt".to_owned(), "val".to_owned()]
        );
    }

    #[test]
    fn duplicate_extra_pairs_are_kept() {
        let mut config = sample_config();
        let pair = ExtraArg {
            option: "-addoninstall".to_owned(),
            value: "ascanrules".to_owned(),
        };
        config.extra_args = vec![pair.clone(), pair];
        let cmd = build_command(&config).unwrap();
        assert_eq!(
            cmd.iter().filter(|t| *t == "-addoninstall").count(),
            2,
            "duplicate pairs must be preserved in order"
        );
    }

    #[test]
    fn empty_install_dir_rejected_before_spawn() {
        let mut config = sample_config();
        config.install_dir = String::new();
        let err = build_command(&config).unwrap_err();
        assert!(matches!(err, ConfigError::MissingInstallDir));

        config.install_dir = "   ".to_owned();
        let err = build_command(&config).unwrap_err();
        assert!(matches!(err, ConfigError::MissingInstallDir));
    }

    #[test]
    fn home_dir_and_extras_compose() {
        let mut config = sample_config();
        config.home_dir = "/home/scan".to_owned();
        config.extra_args = vec![ExtraArg {
            option: "-quiet".to_owned(),
            value: String::new(),
        }];
        let cmd = build_command(&config).unwrap();
        assert_eq!(
            &cmd[8..],
            &["-dir".to_owned(), "/home/scan".to_owned(), "-quiet".to_owned()]
        );
    }
}
