use crate::context::TraceCarrier;
use crate::enrich::enrich;
use crate::handler::{FileHandler, RecordHandler};
use crate::record::{Attr, Level, LogRecord, SourceLocation};
use std::panic::Location;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Shared delivery path: minimum level, console handler, file handler.
pub(crate) struct Pipeline {
    level: AtomicU8,
    console: Box<dyn RecordHandler>,
    file: FileHandler,
}

impl Pipeline {
    pub(crate) fn new(level: Level, console: Box<dyn RecordHandler>, file: FileHandler) -> Self {
        Pipeline {
            level: AtomicU8::new(level as u8),
            console,
            file,
        }
    }

    pub(crate) fn level(&self) -> Level {
        Level::from_u8(self.level.load(Ordering::Relaxed))
    }

    pub(crate) fn set_level(&self, level: Level) {
        self.level.store(level as u8, Ordering::Relaxed);
    }

    pub(crate) fn enabled(&self, level: Level) -> bool {
        level >= self.level()
    }

    /// Console always, file only while its sink is enabled. Failures are
    /// reported on stderr and the record is dropped for that sink.
    pub(crate) fn dispatch(&self, record: &LogRecord) {
        if let Err(e) = self.console.handle(record) {
            eprintln!("console log write failed: {}", e);
        }
        if self.file.is_active() {
            if let Err(e) = self.file.handle(record) {
                eprintln!("file log write failed, record dropped: {}", e);
            }
        }
    }

    pub(crate) fn flush(&self) {
        if let Err(e) = self.console.flush() {
            eprintln!("console log flush failed: {}", e);
        }
        if let Err(e) = self.file.flush() {
            eprintln!("file log flush failed: {}", e);
        }
    }
}

/// Leveled logging entry points, plain and trace-carrier aware.
///
/// Every method is `#[track_caller]`: when source tracking is on, the
/// reported `source` is the line that called the method (or the line that
/// called a `#[track_caller]` wrapper around it), never a frame inside
/// this crate.
#[derive(Clone)]
pub struct Logger {
    pipeline: Arc<Pipeline>,
    add_source: bool,
}

impl Logger {
    pub(crate) fn new(pipeline: Arc<Pipeline>, add_source: bool) -> Self {
        Logger {
            pipeline,
            add_source,
        }
    }

    pub fn adds_source(&self) -> bool {
        self.add_source
    }

    pub fn enabled(&self, level: Level) -> bool {
        self.pipeline.enabled(level)
    }

    /// Log at `level`, taking the trace id from `carrier` when present.
    #[track_caller]
    pub fn log(&self, level: Level, carrier: Option<&dyn TraceCarrier>, msg: &str, attrs: &[Attr]) {
        self.emit(level, carrier, msg, attrs, Location::caller());
    }

    #[track_caller]
    pub fn debug(&self, msg: &str, attrs: &[Attr]) {
        self.emit(Level::Debug, None, msg, attrs, Location::caller());
    }

    #[track_caller]
    pub fn info(&self, msg: &str, attrs: &[Attr]) {
        self.emit(Level::Info, None, msg, attrs, Location::caller());
    }

    #[track_caller]
    pub fn warn(&self, msg: &str, attrs: &[Attr]) {
        self.emit(Level::Warn, None, msg, attrs, Location::caller());
    }

    #[track_caller]
    pub fn error(&self, msg: &str, attrs: &[Attr]) {
        self.emit(Level::Error, None, msg, attrs, Location::caller());
    }

    #[track_caller]
    pub fn debug_ctx(&self, carrier: &dyn TraceCarrier, msg: &str, attrs: &[Attr]) {
        self.emit(Level::Debug, Some(carrier), msg, attrs, Location::caller());
    }

    #[track_caller]
    pub fn info_ctx(&self, carrier: &dyn TraceCarrier, msg: &str, attrs: &[Attr]) {
        self.emit(Level::Info, Some(carrier), msg, attrs, Location::caller());
    }

    #[track_caller]
    pub fn warn_ctx(&self, carrier: &dyn TraceCarrier, msg: &str, attrs: &[Attr]) {
        self.emit(Level::Warn, Some(carrier), msg, attrs, Location::caller());
    }

    #[track_caller]
    pub fn error_ctx(&self, carrier: &dyn TraceCarrier, msg: &str, attrs: &[Attr]) {
        self.emit(Level::Error, Some(carrier), msg, attrs, Location::caller());
    }

    fn emit(
        &self,
        level: Level,
        carrier: Option<&dyn TraceCarrier>,
        msg: &str,
        attrs: &[Attr],
        location: &'static Location<'static>,
    ) {
        if !self.pipeline.enabled(level) {
            return;
        }
        let source = self.add_source.then(|| SourceLocation::from(location));
        let record = enrich(level, msg, carrier, source, attrs.iter().cloned());
        self.pipeline.dispatch(&record);
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.pipeline.level())
            .field("add_source", &self.add_source)
            .finish()
    }
}
