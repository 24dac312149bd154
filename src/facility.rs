use crate::config::LoggingConfig;
use crate::file_sink::RotatingFileSink;
use crate::handler::{ConsoleHandler, FileHandler, RecordHandler};
use crate::logger::{Logger, Pipeline};
use crate::record::Level;
use std::sync::Arc;

/// Everything a process needs to log: the default logger (with source
/// tracking per config), the minimal logger (never tracks source), one
/// shared minimum level and the daily file sink.
///
/// Construct once at startup and hand out references or clones of the
/// loggers. Nothing here is global; see [`crate::global`] for the
/// process-wide convenience layer.
pub struct LoggingFacility {
    config: LoggingConfig,
    pipeline: Arc<Pipeline>,
    sink: Arc<RotatingFileSink>,
    logger: Logger,
    min: Logger,
}

impl LoggingFacility {
    /// Facility printing to stdout and writing files under `config.log_dir`.
    pub fn new(config: LoggingConfig) -> Self {
        let console = ConsoleHandler::stdout(config.ansi);
        let sink = RotatingFileSink::new(config.log_dir.clone());
        Self::with_handlers(config, Box::new(console), sink)
    }

    /// Facility with an explicit console handler and file sink.
    ///
    /// `config.log_dir` is informational here; files go wherever `sink`
    /// points.
    pub fn with_handlers(
        config: LoggingConfig,
        console: Box<dyn RecordHandler>,
        sink: RotatingFileSink,
    ) -> Self {
        let sink = Arc::new(sink);
        if config.file_logging {
            sink.enable();
        }

        let pipeline = Arc::new(Pipeline::new(
            config.level,
            console,
            FileHandler::new(Arc::clone(&sink)),
        ));

        LoggingFacility {
            logger: Logger::new(Arc::clone(&pipeline), config.add_source),
            min: Logger::new(Arc::clone(&pipeline), false),
            config,
            pipeline,
            sink,
        }
    }

    pub fn from_env() -> Self {
        Self::new(LoggingConfig::from_env())
    }

    pub fn config(&self) -> &LoggingConfig {
        &self.config
    }

    /// Default logger.
    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Logger for hot paths: same sinks, no source capture.
    pub fn min(&self) -> &Logger {
        &self.min
    }

    pub fn level(&self) -> Level {
        self.pipeline.level()
    }

    /// Set the minimum level for both sinks and both loggers.
    pub fn set_level(&self, level: Level) {
        self.pipeline.set_level(level);
    }

    pub fn enable_file_logging(&self) {
        self.sink.enable();
    }

    /// Stop file output, flushing and closing the current file immediately.
    pub fn disable_file_logging(&self) {
        self.sink.disable();
    }

    pub fn file_logging_enabled(&self) -> bool {
        self.sink.is_enabled()
    }

    pub fn file_sink(&self) -> &Arc<RotatingFileSink> {
        &self.sink
    }

    pub fn flush(&self) {
        self.pipeline.flush();
    }

    pub(crate) fn pipeline(&self) -> &Arc<Pipeline> {
        &self.pipeline
    }
}

impl std::fmt::Debug for LoggingFacility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggingFacility")
            .field("level", &self.level())
            .field("sink", &self.sink)
            .finish()
    }
}
