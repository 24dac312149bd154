use std::sync::Arc;
use std::thread;
use std::time::Instant;

use tracing_day_sink::config::LoggingConfig;
use tracing_day_sink::file_sink::RotatingFileSink;
use tracing_day_sink::handler::NoopHandler;
use tracing_day_sink::{attr, LoggingFacility};

fn main() {
    let config = LoggingConfig::from_env();
    let sink = RotatingFileSink::new(config.log_dir.clone());
    let facility = Arc::new(LoggingFacility::with_handlers(config, Box::new(NoopHandler), sink));
    facility.enable_file_logging();

    let threads: u64 = 8;
    let per_thread: u64 = 25_000;
    let start = Instant::now();

    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let facility = Arc::clone(&facility);
            thread::spawn(move || {
                for i in 0..per_thread {
                    facility
                        .min()
                        .info("file load test", &[attr("worker", t), attr("iteration", i)]);
                }
            })
        })
        .collect();
    for handle in handles {
        let _ = handle.join();
    }
    facility.flush();

    let n = threads * per_thread;
    let elapsed = start.elapsed();
    println!(
        "file sink: wrote {} records to {} in {:?} (~{:.0} rec/s)",
        n,
        facility.file_sink().dir().display(),
        elapsed,
        n as f64 / elapsed.as_secs_f64()
    );
}
