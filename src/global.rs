//! Process-wide convenience layer over a single [`LoggingFacility`].
//!
//! The first call to [`facility`] builds one from the environment unless
//! [`init`] ran earlier. Everything here forwards to that instance.

use crate::config::LoggingConfig;
use crate::context::TraceCarrier;
use crate::facility::LoggingFacility;
use crate::init::InitError;
use crate::logger::Logger;
use crate::record::{Attr, Level};
use std::sync::OnceLock;

static FACILITY: OnceLock<LoggingFacility> = OnceLock::new();

/// Install the global facility from `config`.
///
/// **Returns**
/// - `Err(InitError::AlreadyInitialized)` if a facility already exists,
///   including one created lazily by an earlier logging call.
pub fn init(config: LoggingConfig) -> Result<&'static LoggingFacility, InitError> {
    let mut created = false;
    let facility = FACILITY.get_or_init(|| {
        created = true;
        LoggingFacility::new(config)
    });
    if created {
        Ok(facility)
    } else {
        Err(InitError::AlreadyInitialized)
    }
}

/// Initialize from the environment with `level` as the minimum, or adjust
/// the level of an existing facility.
pub fn init_logger(level: Level) -> &'static LoggingFacility {
    match init(LoggingConfig::from_env().with_level(level)) {
        Ok(facility) => facility,
        Err(_) => {
            let facility = facility();
            facility.set_level(level);
            facility
        }
    }
}

pub fn facility() -> &'static LoggingFacility {
    FACILITY.get_or_init(LoggingFacility::from_env)
}

pub fn logger() -> &'static Logger {
    facility().logger()
}

/// Minimal logger (no source capture).
pub fn min() -> &'static Logger {
    facility().min()
}

pub fn enable_file_logging() {
    facility().enable_file_logging();
}

pub fn disable_file_logging() {
    facility().disable_file_logging();
}

#[track_caller]
pub fn debug(msg: &str, attrs: &[Attr]) {
    logger().debug(msg, attrs);
}

#[track_caller]
pub fn info(msg: &str, attrs: &[Attr]) {
    logger().info(msg, attrs);
}

#[track_caller]
pub fn warn(msg: &str, attrs: &[Attr]) {
    logger().warn(msg, attrs);
}

#[track_caller]
pub fn error(msg: &str, attrs: &[Attr]) {
    logger().error(msg, attrs);
}

#[track_caller]
pub fn debug_ctx(carrier: &dyn TraceCarrier, msg: &str, attrs: &[Attr]) {
    logger().debug_ctx(carrier, msg, attrs);
}

#[track_caller]
pub fn info_ctx(carrier: &dyn TraceCarrier, msg: &str, attrs: &[Attr]) {
    logger().info_ctx(carrier, msg, attrs);
}

#[track_caller]
pub fn warn_ctx(carrier: &dyn TraceCarrier, msg: &str, attrs: &[Attr]) {
    logger().warn_ctx(carrier, msg, attrs);
}

#[track_caller]
pub fn error_ctx(carrier: &dyn TraceCarrier, msg: &str, attrs: &[Attr]) {
    logger().error_ctx(carrier, msg, attrs);
}
