use crate::env::{env_non_empty, parse_flag, DEFAULT_LOG_DIR, LOG_DIR_PATH_ENV, LOG_LEVEL_ENV, LOG_TO_FILE_ENV};
use crate::record::Level;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings for a [`LoggingFacility`](crate::facility::LoggingFacility).
///
/// **Fields**
/// - `level`: minimum level emitted by both console and file.
/// - `log_dir`: directory holding the `<YYYY-MM-DD>.log` files.
/// - `file_logging`: enable the file sink right after construction.
/// - `add_source`: attach the `source` attribute in the default logger.
///   The minimal logger never does.
/// - `ansi`: colour the level token on the console.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: Level,
    pub log_dir: PathBuf,
    pub file_logging: bool,
    pub add_source: bool,
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::Info,
            log_dir: resolve_log_dir(None, std::env::current_dir().ok().as_deref()),
            file_logging: false,
            add_source: true,
            ansi: true,
        }
    }
}

impl LoggingConfig {
    /// Defaults overridden by `LOG_DIR_PATH`, `LOG_LEVEL` and `LOG_TO_FILE`.
    ///
    /// An unparsable `LOG_LEVEL` is ignored and the default level kept.
    pub fn from_env() -> Self {
        Self::from_lookup(env_non_empty, std::env::current_dir().ok().as_deref())
    }

    /// Same as [`LoggingConfig::from_env`] with an explicit variable lookup
    /// and working directory.
    pub fn from_lookup<F>(lookup: F, cwd: Option<&Path>) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self {
            log_dir: resolve_log_dir(lookup(LOG_DIR_PATH_ENV).as_deref(), cwd),
            ..Self::default()
        };

        if let Some(level) = lookup(LOG_LEVEL_ENV).and_then(|v| v.parse().ok()) {
            config.level = level;
        }
        if let Some(flag) = lookup(LOG_TO_FILE_ENV) {
            config.file_logging = parse_flag(&flag);
        }

        config
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = dir.into();
        self
    }
}

/// Where log files go: `env_value` if set and non-empty, otherwise
/// `<cwd>/external/logs`, or the relative `external/logs` when the working
/// directory is unknown.
pub fn resolve_log_dir(env_value: Option<&str>, cwd: Option<&Path>) -> PathBuf {
    match env_value.filter(|v| !v.is_empty()) {
        Some(dir) => PathBuf::from(dir),
        None => match cwd {
            Some(cwd) => cwd.join(DEFAULT_LOG_DIR),
            None => PathBuf::from(DEFAULT_LOG_DIR),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn unset_dir_defaults_under_working_directory() {
        let config = LoggingConfig::from_lookup(lookup(&[]), Some(Path::new("/app")));
        assert_eq!(config.log_dir, PathBuf::from("/app/external/logs"));
        assert_eq!(config.level, Level::Info);
        assert!(!config.file_logging);
    }

    #[test]
    fn unknown_working_directory_falls_back_to_relative() {
        assert_eq!(resolve_log_dir(None, None), PathBuf::from("external/logs"));
        assert_eq!(resolve_log_dir(Some(""), None), PathBuf::from("external/logs"));
    }

    #[test]
    fn env_overrides_are_applied() {
        let config = LoggingConfig::from_lookup(
            lookup(&[
                ("LOG_DIR_PATH", "/var/log/svc"),
                ("LOG_LEVEL", "WARN"),
                ("LOG_TO_FILE", "yes"),
            ]),
            Some(Path::new("/app")),
        );
        assert_eq!(config.log_dir, PathBuf::from("/var/log/svc"));
        assert_eq!(config.level, Level::Warn);
        assert!(config.file_logging);
    }

    #[test]
    fn bad_level_keeps_default() {
        let config = LoggingConfig::from_lookup(lookup(&[("LOG_LEVEL", "loud")]), None);
        assert_eq!(config.level, Level::Info);
    }

    #[test]
    fn deserializes_partial_config() {
        let config: LoggingConfig =
            serde_json::from_str(r#"{"level":"debug","log_dir":"/tmp/x"}"#).unwrap();
        assert_eq!(config.level, Level::Debug);
        assert_eq!(config.log_dir, PathBuf::from("/tmp/x"));
        assert!(config.add_source);
    }
}
