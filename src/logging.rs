//! File-based logging for band-site
//!
//! The terminal is owned by the TUI, so tracing output goes to a daily
//! rolling file instead of stdout.

use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

const LOG_FILE_PREFIX: &str = "band-site";

/// Initialize the logging system.
///
/// Logs are written to `<log_dir>/band-site.YYYY-MM-DD.log` with daily rotation.
/// The log level can be controlled via the `RUST_LOG` environment variable.
///
/// Default log levels:
/// - `band_site` modules: DEBUG
/// - `reqwest`: INFO
/// - Other crates: WARN
pub fn init_logging(log_dir: &Path) -> anyhow::Result<()> {
    if !log_dir.exists() {
        std::fs::create_dir_all(log_dir)?;
    }

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, LOG_FILE_PREFIX);

    // Non-blocking so a slow disk never stalls the render loop
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // The guard must outlive the subscriber; the process owns it until exit
    Box::leak(Box::new(guard));

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("band_site=debug,reqwest=info,warn"));

    let fmt_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_span_events(FmtSpan::CLOSE);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;

    tracing::info!(log_dir = %log_dir.display(), "Logging initialized");

    Ok(())
}

/// Log a remote API request and its result
#[macro_export]
macro_rules! log_api_result {
    ($operation:expr, $result:expr) => {
        match &$result {
            Ok(_) => tracing::info!(operation = $operation, "API request successful"),
            Err(e) => tracing::error!(operation = $operation, error = %e, "API request failed"),
        }
    };
}

/// Log a remote API request with additional context
#[macro_export]
macro_rules! log_api_request {
    ($operation:expr) => {
        tracing::debug!(operation = $operation, "API request started");
    };
    ($operation:expr, $($field:tt)*) => {
        tracing::debug!(operation = $operation, $($field)*, "API request started");
    };
}
