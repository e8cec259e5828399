//! Observability infrastructure for Mosaic.
//!
//! Structured logging with consistent spans. Per-backend failures withheld by
//! the federation engine are logged here rather than surfaced to callers, so
//! the log stream is the place to look for full per-collection diagnostics.

use std::sync::Once;
use tracing::Span;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Log output format.
#[derive(Debug, Clone, Copy, Default)]
pub enum LogFormat {
    /// JSON structured logs (for production).
    Json,
    /// Pretty-printed logs (for development).
    #[default]
    Pretty,
}

/// Initializes the logging subsystem.
///
/// Call once at application startup. Safe to call multiple times;
/// subsequent calls are no-ops.
///
/// # Environment Variables
///
/// - `RUST_LOG`: Controls log levels (e.g., `info`, `mosaic_federation=debug`)
///
/// # Example
///
/// ```rust
/// use mosaic_core::observability::{init_logging, LogFormat};
///
/// init_logging(LogFormat::Pretty);
/// ```
pub fn init_logging(format: LogFormat) {
    INIT.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        match format {
            LogFormat::Json => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt::layer().json())
                    .init();
            }
            LogFormat::Pretty => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt::layer().pretty())
                    .init();
            }
        }
    });
}

/// Creates a span for federated catalog operations with standard fields.
///
/// # Example
///
/// ```rust
/// use mosaic_core::observability::federation_span;
///
/// let span = federation_span("get_detail", "req-1", "alice", "entity-guid");
/// let _guard = span.enter();
/// // ... drive the federated request
/// ```
#[must_use]
pub fn federation_span(operation: &str, request_id: &str, user: &str, entity: &str) -> Span {
    tracing::info_span!(
        "federation",
        op = operation,
        request_id = request_id,
        user = user,
        entity = entity,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_logging_is_idempotent() {
        init_logging(LogFormat::Pretty);
        init_logging(LogFormat::Pretty); // Second call should be no-op
    }

    #[test]
    fn federation_span_creates_span() {
        let span = federation_span("get_detail", "req-1", "alice", "guid");
        let _guard = span.enter();
        tracing::info!("test message in span");
    }
}
