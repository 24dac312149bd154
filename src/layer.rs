use crate::context::{RequestValues, TRACE_ID_KEY};
use crate::enrich::enrich;
use crate::facility::LoggingFacility;
use crate::logger::Pipeline;
use crate::record::{Attr, Level, SourceLocation};
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id, Record};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// `tracing_subscriber` layer that turns `tracing` events into enriched
/// records and delivers them through a [`LoggingFacility`]'s console and
/// file path.
///
/// A field named `trace_id` on the event, or on any enclosing span,
/// becomes the record's trace id. Event metadata supplies the source
/// location when source tracking is on.
pub struct FacilityLayer {
    pipeline: Arc<Pipeline>,
    add_source: bool,
}

impl FacilityLayer {
    pub fn new(facility: &LoggingFacility) -> Self {
        FacilityLayer {
            pipeline: Arc::clone(facility.pipeline()),
            add_source: facility.config().add_source,
        }
    }

    pub fn with_source(mut self, add_source: bool) -> Self {
        self.add_source = add_source;
        self
    }
}

/// Trace id recorded on a span, kept in the span's extensions.
struct SpanTraceId(String);

impl<S> Layer<S> for FacilityLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let mut visitor = TraceIdVisitor::default();
        attrs.record(&mut visitor);
        if let (Some(trace_id), Some(span)) = (visitor.trace_id, ctx.span(id)) {
            span.extensions_mut().insert(SpanTraceId(trace_id));
        }
    }

    fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
        let mut visitor = TraceIdVisitor::default();
        values.record(&mut visitor);
        if let (Some(trace_id), Some(span)) = (visitor.trace_id, ctx.span(id)) {
            let mut extensions = span.extensions_mut();
            extensions.remove::<SpanTraceId>();
            extensions.insert(SpanTraceId(trace_id));
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let meta = event.metadata();
        let level = Level::from(*meta.level());
        if !self.pipeline.enabled(level) {
            return;
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let trace_id = visitor.trace_id.take().or_else(|| {
            ctx.event_scope(event)?.find_map(|span| {
                let extensions = span.extensions();
                extensions.get::<SpanTraceId>().map(|id| id.0.clone())
            })
        });

        let mut carrier = RequestValues::new();
        if let Some(trace_id) = trace_id {
            carrier.set(TRACE_ID_KEY, trace_id);
        }

        let source = if self.add_source {
            meta.file()
                .zip(meta.line())
                .map(|(file, line)| SourceLocation::new(file, line))
        } else {
            None
        };

        let record = enrich(
            level,
            visitor.message.unwrap_or_default(),
            Some(&carrier),
            source,
            visitor.fields,
        );
        self.pipeline.dispatch(&record);
    }
}

/// Collects an event's message, its `trace_id` and the remaining fields in
/// recording order.
#[derive(Default)]
struct FieldVisitor {
    message: Option<String>,
    trace_id: Option<String>,
    fields: Vec<Attr>,
}

impl FieldVisitor {
    fn push(&mut self, field: &Field, value: serde_json::Value) {
        self.fields.push(Attr::new(field.name(), value));
    }
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "message" => self.message = Some(value.to_string()),
            TRACE_ID_KEY => self.trace_id = Some(value.to_string()),
            _ => self.push(field, serde_json::Value::String(value.to_string())),
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.push(field, serde_json::Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.push(field, serde_json::Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        // JSON has no NaN or infinity; keep them as text instead of null.
        let value = if value.is_finite() {
            serde_json::Value::from(value)
        } else {
            serde_json::Value::String(value.to_string())
        };
        self.push(field, value);
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.push(field, serde_json::Value::from(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let text = format!("{:?}", value);
        match field.name() {
            "message" => self.message = Some(text),
            TRACE_ID_KEY => self.trace_id = Some(text),
            _ => self.push(field, serde_json::Value::String(text)),
        }
    }
}

#[derive(Default)]
struct TraceIdVisitor {
    trace_id: Option<String>,
}

impl Visit for TraceIdVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == TRACE_ID_KEY {
            self.trace_id = Some(value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == TRACE_ID_KEY {
            self.trace_id = Some(format!("{:?}", value));
        }
    }
}
