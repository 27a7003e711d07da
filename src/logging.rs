//! Logging configuration for the portal client
//!
//! Structured logging setup with appropriate levels and formatting.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::{Config, LogFormat};
use crate::error::ClientError;

/// Initialize the client logging system.
///
/// `RUST_LOG` wins over the configured level. Calling this twice is harmless;
/// the second subscriber is discarded.
pub fn init_logging(config: &Config) {
    let default_filter = format!("school_portal_client={},reqwest=warn", config.log_level);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let (json, console) = match config.log_format {
        LogFormat::Json => (Some(json_layer()), None),
        LogFormat::Compact => (None, Some(console_layer())),
    };

    let initialized = tracing_subscriber::registry()
        .with(env_filter)
        .with(json)
        .with(console)
        .try_init();

    if initialized.is_ok() {
        tracing::info!("Logging system initialized");
    }
}

/// JSON logging layer for production
fn json_layer<S>() -> Box<dyn Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .boxed()
}

/// Console logging layer for development
fn console_layer<S>() -> Box<dyn Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .with_ansi(true)
        .boxed()
}

/// Create a span for an outgoing HTTP request
#[macro_export]
macro_rules! request_span {
    ($method:expr, $path:expr) => {
        tracing::info_span!(
            "http_request",
            method = %$method,
            path = %$path,
            status_code = tracing::field::Empty,
            duration_ms = tracing::field::Empty,
        )
    };
}

/// Create a span for a panel fetch or mutation
#[macro_export]
macro_rules! panel_span {
    ($panel:expr, $operation:expr) => {
        tracing::debug_span!(
            "panel_operation",
            panel = %$panel,
            operation = %$operation,
            generation = tracing::field::Empty,
        )
    };
}

/// Log client startup
pub fn log_startup() {
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "School portal client starting up"
    );
}

/// Log a completed HTTP request
pub fn log_request_completed(method: &str, path: &str, status: u16, duration_ms: u64) {
    tracing::debug!(
        method = %method,
        path = %path,
        status = status,
        duration_ms = duration_ms,
        "Request completed"
    );
}

/// Log a fetch that fell back to the empty state
pub fn log_fetch_failure(panel: &str, error: &ClientError) {
    if error.is_server_error() {
        tracing::error!(
            panel = %panel,
            error_code = error.error_code(),
            error = %error,
            "Fetch failed, rendering empty state"
        );
    } else {
        tracing::warn!(
            panel = %panel,
            error_code = error.error_code(),
            error = %error,
            "Fetch failed, rendering empty state"
        );
    }
}

/// Log an optimistic update whose request failed
pub fn log_optimistic_rollover(panel: &str, item_id: &str, error: &ClientError) {
    tracing::warn!(
        panel = %panel,
        item_id = %item_id,
        error = %error,
        "Optimistic update marked as failed"
    );
}

/// Log a result discarded because a newer fetch or an unmount superseded it
pub fn log_stale_result(panel: &str, generation: u64) {
    tracing::debug!(
        panel = %panel,
        generation = generation,
        "Discarding superseded fetch result"
    );
}
