//! Observability infrastructure for strata.
//!
//! Structured logging with consistent spans. This module provides
//! initialization helpers and span constructors used by the procedure layer.

use std::sync::Once;
use tracing::Span;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

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
/// - `RUST_LOG`: Controls log levels (e.g., `info`, `strata_procedures=debug`)
///
/// # Example
///
/// ```rust
/// use strata_core::observability::{init_logging, LogFormat};
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

/// Creates a span for catalog procedure invocations with standard fields.
///
/// # Example
///
/// ```rust
/// use strata_core::observability::procedure_span;
///
/// let span = procedure_span("create_empty_partition", "sales_db", "sales");
/// let _guard = span.enter();
/// // ... run the procedure
/// ```
#[must_use]
pub fn procedure_span(procedure: &str, schema: &str, table: &str) -> Span {
    tracing::info_span!(
        "procedure",
        procedure = procedure,
        schema = schema,
        table = table,
    )
}
