use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity of a [`LogRecord`], ordered `Debug < Info < Warn < Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
}

impl Level {
    pub const ALL: [Level; 4] = [Level::Debug, Level::Info, Level::Warn, Level::Error];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }

    pub(crate) fn from_u8(value: u8) -> Level {
        match value {
            0 => Level::Debug,
            1 => Level::Info,
            2 => Level::Warn,
            _ => Level::Error,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a level name is not one of debug/info/warn/error.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown log level: {0}")]
pub struct ParseLevelError(pub String);

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(Level::Debug),
            "INFO" => Ok(Level::Info),
            "WARN" | "WARNING" => Ok(Level::Warn),
            "ERROR" => Ok(Level::Error),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        if level == tracing::Level::ERROR {
            Level::Error
        } else if level == tracing::Level::WARN {
            Level::Warn
        } else if level == tracing::Level::INFO {
            Level::Info
        } else {
            // TRACE folds into DEBUG.
            Level::Debug
        }
    }
}

/// A caller-supplied key/value pair.
///
/// Values keep their JSON shape; strings are rendered without quotes,
/// everything else through its JSON text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attr {
    pub key: String,
    pub value: serde_json::Value,
}

impl Attr {
    pub fn new(key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Attr {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Textual form of the value as it appears in rendered output.
    pub fn value_text(&self) -> String {
        match &self.value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Shorthand for [`Attr::new`].
pub fn attr(key: impl Into<String>, value: impl Into<serde_json::Value>) -> Attr {
    Attr::new(key, value)
}

/// Call site that emitted a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        SourceLocation {
            file: file.into(),
            line,
        }
    }
}

impl From<&std::panic::Location<'_>> for SourceLocation {
    fn from(location: &std::panic::Location<'_>) -> Self {
        SourceLocation::new(location.file(), location.line())
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:{}]", self.file, self.line)
    }
}

/// Enriched record handed to the renderers.
#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    pub timestamp: DateTime<FixedOffset>,
    pub level: Level,
    pub message: String,
    pub trace_id: Option<String>,
    pub source: Option<SourceLocation>,
    pub attributes: Vec<Attr>,
}

impl LogRecord {
    /// All attributes in render order: `trace_id`, then `source`, then
    /// caller attributes as supplied (duplicates kept).
    pub fn rendered_attrs(&self) -> Vec<Attr> {
        let mut out = Vec::with_capacity(self.attributes.len() + 2);
        if let Some(trace_id) = &self.trace_id {
            out.push(Attr::new(crate::context::TRACE_ID_KEY, trace_id.as_str()));
        }
        if let Some(source) = &self.source {
            out.push(Attr::new("source", source.to_string()));
        }
        out.extend(self.attributes.iter().cloned());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record() -> LogRecord {
        LogRecord {
            timestamp: FixedOffset::east_opt(0)
                .unwrap()
                .with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
                .unwrap(),
            level: Level::Info,
            message: "hello".into(),
            trace_id: Some("abc-123".into()),
            source: Some(SourceLocation::new("src/main.rs", 10)),
            attributes: vec![attr("user", 7), attr("user", "again")],
        }
    }

    #[test]
    fn levels_are_totally_ordered() {
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Warn);
        assert!(Level::Warn < Level::Error);
    }

    #[test]
    fn level_parses_case_insensitively() {
        assert_eq!("warn".parse::<Level>(), Ok(Level::Warn));
        assert_eq!(" Error ".parse::<Level>(), Ok(Level::Error));
        assert!("verbose".parse::<Level>().is_err());
    }

    #[test]
    fn tracing_trace_folds_into_debug() {
        assert_eq!(Level::from(tracing::Level::TRACE), Level::Debug);
        assert_eq!(Level::from(tracing::Level::WARN), Level::Warn);
    }

    #[test]
    fn rendered_attrs_put_trace_and_source_first() {
        let keys: Vec<_> = record()
            .rendered_attrs()
            .into_iter()
            .map(|a| a.key)
            .collect();
        assert_eq!(keys, ["trace_id", "source", "user", "user"]);
    }

    #[test]
    fn value_text_strips_string_quotes_only() {
        assert_eq!(attr("k", "v").value_text(), "v");
        assert_eq!(attr("k", 42).value_text(), "42");
        assert_eq!(attr("k", true).value_text(), "true");
    }
}
