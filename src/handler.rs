use crate::file_sink::{RotatingFileSink, SinkError};
use crate::record::LogRecord;
use crate::render::{render_console, render_file};
use std::io::{self, Write};
use std::sync::Arc;
use tracing_subscriber::fmt::MakeWriter;

/// Errors a handler can report for a single record.
#[derive(thiserror::Error, Debug)]
pub enum HandlerError {
    #[error("log output failed: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    File(#[from] SinkError),
}

/// Destination for enriched [`LogRecord`]s.
///
/// Handlers render and emit synchronously on the caller's thread. Level
/// filtering happens before a record is built, so `handle` sees only
/// records that passed the facility's minimum level.
pub trait RecordHandler: Send + Sync {
    /// Whether this handler would currently emit anything at all.
    fn is_active(&self) -> bool {
        true
    }

    /// Render and emit one record.
    ///
    /// **Returns**
    /// - `Ok(())` if the record was written or intentionally skipped.
    /// - `Err(..)` if the underlying stream or file failed. The caller
    ///   reports and drops the record; it is never retried.
    fn handle(&self, record: &LogRecord) -> Result<(), HandlerError>;

    /// Flush buffered output. Default implementation is a no-op.
    fn flush(&self) -> Result<(), HandlerError> {
        Ok(())
    }
}

/// Single-line console output through a [`MakeWriter`] (stdout by default).
///
/// Each record is written with one `write_all` call; interleaving between
/// threads is only as fine-grained as the target stream allows.
pub struct ConsoleHandler<W = fn() -> io::Stdout> {
    make_writer: W,
    ansi: bool,
}

impl ConsoleHandler {
    pub fn stdout(ansi: bool) -> Self {
        ConsoleHandler {
            make_writer: io::stdout,
            ansi,
        }
    }
}

impl<W> ConsoleHandler<W>
where
    W: for<'a> MakeWriter<'a> + Send + Sync,
{
    pub fn with_writer(make_writer: W, ansi: bool) -> Self {
        ConsoleHandler { make_writer, ansi }
    }
}

impl<W> RecordHandler for ConsoleHandler<W>
where
    W: for<'a> MakeWriter<'a> + Send + Sync,
{
    fn handle(&self, record: &LogRecord) -> Result<(), HandlerError> {
        let mut line = render_console(record, self.ansi);
        line.push('\n');
        let mut writer = self.make_writer.make_writer();
        writer.write_all(line.as_bytes())?;
        Ok(())
    }

    fn flush(&self) -> Result<(), HandlerError> {
        self.make_writer.make_writer().flush()?;
        Ok(())
    }
}

/// Tree-layout output into a shared [`RotatingFileSink`].
pub struct FileHandler {
    sink: Arc<RotatingFileSink>,
}

impl FileHandler {
    pub fn new(sink: Arc<RotatingFileSink>) -> Self {
        FileHandler { sink }
    }

    pub fn sink(&self) -> &Arc<RotatingFileSink> {
        &self.sink
    }
}

impl RecordHandler for FileHandler {
    fn is_active(&self) -> bool {
        self.sink.is_enabled()
    }

    fn handle(&self, record: &LogRecord) -> Result<(), HandlerError> {
        self.sink.append(&render_file(record))?;
        Ok(())
    }

    fn flush(&self) -> Result<(), HandlerError> {
        self.sink.flush()?;
        Ok(())
    }
}

/// A handler that drops every record.
///
/// Useful as the console side when only the file output matters, and for
/// measuring the cost of enrichment without any I/O.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopHandler;

impl RecordHandler for NoopHandler {
    fn is_active(&self) -> bool {
        false
    }

    fn handle(&self, _record: &LogRecord) -> Result<(), HandlerError> {
        Ok(())
    }
}
