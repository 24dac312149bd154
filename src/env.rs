//! Environment variable names read by
//! [`LoggingConfig::from_env`](crate::config::LoggingConfig::from_env).
//!
//! These are purely helpers; the facility itself never reads the
//! environment once constructed.

/// Directory for daily log files, absolute or relative to the working directory.
pub const LOG_DIR_PATH_ENV: &str = "LOG_DIR_PATH";

/// Minimum emitted level: `debug`, `info`, `warn` or `error`.
pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";

/// Enable file logging at startup when set to `1`, `true`, `yes` or `on`.
pub const LOG_TO_FILE_ENV: &str = "LOG_TO_FILE";

/// Directory used under the working directory when `LOG_DIR_PATH` is unset.
pub const DEFAULT_LOG_DIR: &str = "external/logs";

/// Read an environment variable, treating empty values as unset.
pub fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

pub(crate) fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
