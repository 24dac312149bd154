use crate::context::{extract_trace_id, TraceCarrier};
use crate::record::{Attr, Level, LogRecord, SourceLocation};
use chrono::Local;

/// Whether `key` can be rendered as `key=value` without ambiguity:
/// non-empty, no whitespace, no control characters, no `=`.
pub fn is_well_formed_key(key: &str) -> bool {
    !key.is_empty() && !key.chars().any(|c| c.is_whitespace() || c.is_control() || c == '=')
}

/// Build an enriched [`LogRecord`].
///
/// The timestamp is taken here and nowhere else. A trace id is attached
/// only when `carrier` yields a non-empty value; `source` is the call site
/// already resolved by the public entry point. Attributes with malformed
/// keys are dropped one by one.
pub fn enrich(
    level: Level,
    message: impl Into<String>,
    carrier: Option<&dyn TraceCarrier>,
    source: Option<SourceLocation>,
    raw_attrs: impl IntoIterator<Item = Attr>,
) -> LogRecord {
    let timestamp = Local::now().fixed_offset();

    LogRecord {
        timestamp,
        level,
        message: message.into(),
        trace_id: extract_trace_id(carrier),
        source,
        attributes: raw_attrs
            .into_iter()
            .filter(|a| is_well_formed_key(&a.key))
            .collect(),
    }
}
