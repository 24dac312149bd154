//! End-to-end checks of the console + daily file path.

use chrono::{Local, NaiveDate};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;
use tracing_day_sink::config::LoggingConfig;
use tracing_day_sink::file_sink::RotatingFileSink;
use tracing_day_sink::handler::NoopHandler;
use tracing_day_sink::{attr, LoggingFacility, RequestContext, TRACE_ID_KEY};

fn file_facility(dir: &Path, sink: RotatingFileSink) -> LoggingFacility {
    let config = LoggingConfig {
        file_logging: true,
        add_source: false,
        ..LoggingConfig::default().with_log_dir(dir)
    };
    LoggingFacility::with_handlers(config, Box::new(NoopHandler), sink)
}

#[test]
fn boot_record_lands_in_todays_file() {
    let tmp = TempDir::new().unwrap();
    let config = LoggingConfig::from_lookup(|_| None, Some(tmp.path()));
    let facility = LoggingFacility::with_handlers(
        config.clone(),
        Box::new(NoopHandler),
        RotatingFileSink::new(config.log_dir.clone()),
    );
    facility.enable_file_logging();
    facility.min().info("boot", &[]);
    facility.flush();

    let today = Local::now().format("%Y-%m-%d").to_string();
    let path = tmp.path().join("external/logs").join(format!("{}.log", today));
    let content = fs::read_to_string(path).unwrap();
    let lines: Vec<_> = content.lines().collect();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with(&format!("[{} ", today)));
    assert!(lines[0].ends_with("| boot"));
}

#[test]
fn default_logger_adds_source_after_trace_id() {
    let tmp = TempDir::new().unwrap();
    let config = LoggingConfig {
        file_logging: true,
        ..LoggingConfig::from_lookup(|_| None, Some(tmp.path()))
    };
    let facility = LoggingFacility::with_handlers(
        config.clone(),
        Box::new(NoopHandler),
        RotatingFileSink::new(config.log_dir.clone()),
    );
    let ctx = RequestContext::background().with_value(TRACE_ID_KEY, "abc-123");

    let boot_line = line!() + 1;
    facility.logger().info("boot", &[]);
    let start_line = line!() + 1;
    facility.logger().info_ctx(&ctx, "request start", &[]);

    let content = fs::read_to_string(facility.file_sink().current_path().unwrap()).unwrap();
    let lines: Vec<_> = content.lines().collect();
    assert_eq!(lines.len(), 5);
    assert!(lines[0].ends_with("| boot"));
    assert_eq!(lines[1], format!("  └─ source: [{}:{}]", file!(), boot_line));
    assert!(lines[2].ends_with("| request start"));
    assert_eq!(lines[3], "  ├─ trace_id: abc-123");
    assert_eq!(lines[4], format!("  └─ source: [{}:{}]", file!(), start_line));
}

#[test]
fn single_trace_id_renders_as_last_branch() {
    let tmp = TempDir::new().unwrap();
    let facility = file_facility(tmp.path(), RotatingFileSink::new(tmp.path()));
    let ctx = RequestContext::background().with_value(TRACE_ID_KEY, "abc-123");
    facility.logger().info_ctx(&ctx, "request start", &[]);

    let path = facility.file_sink().current_path().unwrap();
    let content = fs::read_to_string(path).unwrap();
    let lines: Vec<_> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("INFO  | request start"));
    assert_eq!(lines[1], "  └─ trace_id: abc-123");
}

#[test]
fn attribute_tree_in_file_output() {
    let tmp = TempDir::new().unwrap();
    let facility = file_facility(tmp.path(), RotatingFileSink::new(tmp.path()));
    let ctx = RequestContext::background().with_value(TRACE_ID_KEY, "t-1");
    facility
        .logger()
        .warn_ctx(&ctx, "slow query", &[attr("ms", 1200), attr("table", "orders")]);

    let content = fs::read_to_string(facility.file_sink().current_path().unwrap()).unwrap();
    let lines: Vec<_> = content.lines().skip(1).collect();
    assert_eq!(
        lines,
        ["  ├─ trace_id: t-1", "  ├─ ms: 1200", "  └─ table: orders"]
    );
}

#[test]
fn appends_follow_the_calendar_day() {
    let tmp = TempDir::new().unwrap();
    let day = Arc::new(AtomicU32::new(30));
    let clock = Arc::clone(&day);
    let sink = RotatingFileSink::with_date_source(tmp.path(), move || {
        NaiveDate::from_ymd_opt(2024, 6, clock.load(Ordering::SeqCst)).unwrap()
    });
    let facility = file_facility(tmp.path(), sink);

    facility.min().info("before midnight", &[]);
    day.store(29, Ordering::SeqCst);
    // A clock stepping backwards still writes into the file for its own day.
    facility.min().info("clock skew", &[]);
    day.store(30, Ordering::SeqCst);
    facility.min().info("after skew", &[]);

    let first = fs::read_to_string(tmp.path().join("2024-06-30.log")).unwrap();
    let second = fs::read_to_string(tmp.path().join("2024-06-29.log")).unwrap();
    assert_eq!(first.lines().count(), 2);
    assert!(first.contains("| before midnight"));
    assert!(first.contains("| after skew"));
    assert_eq!(second.lines().count(), 1);
    assert!(second.contains("| clock skew"));
}

#[test]
fn disable_then_enable_reopens_same_file() {
    let tmp = TempDir::new().unwrap();
    let sink = RotatingFileSink::with_date_source(tmp.path(), || {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    });
    let facility = file_facility(tmp.path(), sink);

    facility.min().info("one", &[]);
    facility.disable_file_logging();
    assert!(!facility.file_sink().is_open());
    facility.min().info("dropped from file", &[]);

    facility.enable_file_logging();
    facility.min().info("two", &[]);
    assert_eq!(
        facility.file_sink().current_date(),
        NaiveDate::from_ymd_opt(2024, 1, 15)
    );

    let content = fs::read_to_string(tmp.path().join("2024-01-15.log")).unwrap();
    let messages: Vec<_> = content
        .lines()
        .map(|l| l.rsplit("| ").next().unwrap())
        .collect();
    assert_eq!(messages, ["one", "two"]);
}

#[test]
fn concurrent_writers_produce_whole_records() {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 250;

    let tmp = TempDir::new().unwrap();
    let facility = Arc::new(file_facility(tmp.path(), RotatingFileSink::new(tmp.path())));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let facility = Arc::clone(&facility);
            thread::spawn(move || {
                for i in 0..PER_THREAD {
                    facility
                        .min()
                        .info(&format!("worker-{}-{}", t, i), &[attr("i", i)]);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    facility.flush();

    let mut seen = HashSet::new();
    let mut total = 0;
    for entry in fs::read_dir(tmp.path()).unwrap() {
        let content = fs::read_to_string(entry.unwrap().path()).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len() % 2, 0);
        for pair in lines.chunks(2) {
            let message = pair[0].rsplit("| ").next().unwrap();
            assert!(pair[0].starts_with('['));
            assert!(pair[1].starts_with("  └─ i: "));
            let i = message.rsplit('-').next().unwrap();
            assert_eq!(pair[1], format!("  └─ i: {}", i));
            assert!(seen.insert(message.to_string()));
            total += 1;
        }
    }
    assert_eq!(total, THREADS * PER_THREAD);
}
