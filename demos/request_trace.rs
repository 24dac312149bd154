use std::time::Duration;

use tracing::{error, info, info_span};
use tracing_day_sink::init::init_tracing;
use tracing_day_sink::{attr, ctx_with_trace_id, global, Level, RequestContext, RequestValues};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let facility = global::init_logger(Level::Debug);
    global::enable_file_logging();
    init_tracing(facility);

    global::info("starting service", &[]);

    // Deadline-bearing context, e.g. one outbound call.
    let (ctx, cancel) = ctx_with_trace_id(&RequestContext::background(), Duration::from_millis(200));
    global::info_ctx(&ctx, "request start", &[attr("path", "/orders")]);
    tokio::select! {
        _ = ctx.cancelled() => global::warn_ctx(&ctx, "request timed out", &[]),
        _ = tokio::time::sleep(Duration::from_millis(50)) => global::info_ctx(&ctx, "request done", &[]),
    }
    cancel.cancel();

    // Per-request property bag, as a request handler would keep it.
    let mut values = RequestValues::new();
    values.attach_trace_id();
    global::min().error_ctx(&values, "authentication failed", &[attr("user_id", 42)]);

    // Plain `tracing` events go through the same sinks.
    let span = info_span!("job", trace_id = "job-7");
    let _guard = span.enter();
    info!(rows = 128, "batch imported");
    error!(reason = "constraint violation", "batch rejected");

    facility.flush();
}
