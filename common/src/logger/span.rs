use std::future::Future;
use std::time::{Duration, Instant};

use tracing::{Span, field};

use super::TraceId;

/// Root span for one unit of background work (an ingestion cycle, a cleanup run).
pub fn root_span(name: &'static str, trace_id: &TraceId) -> Span {
    tracing::info_span!(
        "root",
        name = %name,
        trace_id = %trace_id,
        outcome = field::Empty
    )
}

/// Awaits `fut` and emits a `performance` warning when it took longer than `max`.
pub async fn warn_if_slow<F, T>(label: &'static str, max: Duration, fut: F) -> T
where
    F: Future<Output = T>,
{
    let start = Instant::now();
    let out = fut.await;
    let elapsed = start.elapsed();
    if elapsed > max {
        tracing::warn!(
            target: "performance",
            label = label,
            elapsed_ms = elapsed.as_millis() as u64,
            "slow operation detected"
        );
    }
    out
}
