//! Pure renderers, one per sink style.

use crate::record::{Level, LogRecord};
use std::fmt::Write as _;

const COLOR_RESET: &str = "\x1b[0m";
const COLOR_RED: &str = "\x1b[31m";
const COLOR_YELLOW: &str = "\x1b[33m";
const COLOR_BLUE: &str = "\x1b[34m";
const COLOR_GRAY: &str = "\x1b[37m";

const CONSOLE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S %Z";
const FILE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

const BRANCH: &str = "  ├─ ";
const LAST_BRANCH: &str = "  └─ ";

/// Bracketed level token without colour, e.g. `[WARN]`.
pub fn level_token(level: Level) -> String {
    format!("[{}]", level.as_str())
}

/// Bracketed level token wrapped in its ANSI colour.
pub fn colorized_level(level: Level) -> String {
    let color = match level {
        Level::Debug => COLOR_GRAY,
        Level::Info => COLOR_BLUE,
        Level::Warn => COLOR_YELLOW,
        Level::Error => COLOR_RED,
    };
    format!("{}{}{}", color, level_token(level), COLOR_RESET)
}

/// Compact single-line console form:
/// `2024-03-01 12:00:00 +00:00 [INFO] message trace_id=.. k=v`.
///
/// The zone is printed as a numeric UTC offset; `chrono` has no access to
/// zone abbreviations such as `KST`.
pub fn render_console(record: &LogRecord, ansi: bool) -> String {
    let level = if ansi {
        colorized_level(record.level)
    } else {
        level_token(record.level)
    };

    let mut line = format!(
        "{} {} {}",
        record.timestamp.format(CONSOLE_TIME_FORMAT),
        level,
        record.message
    );
    for attr in record.rendered_attrs() {
        let _ = write!(line, " {}={}", attr.key, attr.value_text());
    }
    line
}

/// Multi-line file form: a header followed by one tree line per attribute.
///
/// ```text
/// [2024-03-01 12:00:00.000] INFO  | request start
///   ├─ trace_id: abc-123
///   └─ user: 7
/// ```
pub fn render_file(record: &LogRecord) -> String {
    let mut out = format!(
        "[{}] {:<5} | {}",
        record.timestamp.format(FILE_TIME_FORMAT),
        record.level.as_str(),
        record.message
    );

    let attrs = record.rendered_attrs();
    let last = attrs.len().saturating_sub(1);
    for (i, attr) in attrs.iter().enumerate() {
        let prefix = if i == last { LAST_BRANCH } else { BRANCH };
        let _ = write!(out, "\n{}{}: {}", prefix, attr.key, attr.value_text());
    }
    out
}
