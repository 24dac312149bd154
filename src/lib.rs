pub mod record;
pub mod context;
pub mod enrich;
pub mod render;
pub mod file_sink;
pub mod handler;
pub mod logger;

pub mod config;
pub mod env;
pub mod facility;
pub mod layer;
pub mod init;
pub mod global;

pub use context::{ctx_with_trace_id, extract_trace_id, new_trace_id, RequestContext, RequestValues, TraceCarrier, TRACE_ID_KEY};
pub use facility::LoggingFacility;
pub use logger::Logger;
pub use record::{attr, Attr, Level, LogRecord};
