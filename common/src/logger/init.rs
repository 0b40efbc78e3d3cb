use once_cell::sync::OnceCell;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

static LOGGER_INIT: OnceCell<()> = OnceCell::new();

/// Installs the global subscriber. Later calls are no-ops.
///
/// `json` switches to machine-readable output for production; otherwise the
/// pretty formatter is used. Filtering follows `RUST_LOG`, defaulting to `info`.
pub fn init_tracing(service_name: &'static str, json: bool) {
    LOGGER_INIT.get_or_init(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let base = fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_line_number(true)
            .with_file(true)
            .with_span_events(fmt::format::FmtSpan::CLOSE);

        if json {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(base.json())
                .init();
        } else {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(base.pretty())
                .init();
        }

        tracing::info!(service = service_name, json, "logger initialized");
    });
}
