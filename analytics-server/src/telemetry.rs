//! Telemetry module for logging setup and request spans

use crate::config::ServerConfig;
use std::env;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Telemetry configuration
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Primary log filter (RUST_LOG env var)
    pub log_filter: String,
    /// Fallback log level if RUST_LOG not set
    pub default_level: String,
    /// Request ID header name (default: "x-request-id")
    pub request_id_header: String,
    /// Log format ("human" or "json")
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    Human,
    Json,
}

impl TelemetryConfig {
    /// Create telemetry config with server config for CLI log level support
    pub fn with_server_config(server_config: &ServerConfig) -> Self {
        let rust_log = env::var("RUST_LOG").unwrap_or_default();
        let default_level = if rust_log.is_empty() {
            env::var("LOG_LEVEL").unwrap_or_else(|_| server_config.log_level.clone())
        } else {
            server_config.log_level.clone()
        };

        Self::from_env_with_defaults(default_level)
    }

    fn from_env_with_defaults(default_level: String) -> Self {
        Self {
            log_filter: env::var("RUST_LOG").unwrap_or_default(),
            default_level,
            request_id_header: env::var("LOG_REQUEST_ID_HEADER")
                .unwrap_or_else(|_| "x-request-id".to_string()),
            log_format: match env::var("LOG_FORMAT")
                .unwrap_or_default()
                .to_lowercase()
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Human,
            },
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        let default_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        Self::from_env_with_defaults(default_level)
    }
}

/// Initialize logging
///
/// Sets up the global tracing subscriber with an EnvFilter and a compact
/// fmt layer. Safe to call multiple times; only the first call wins.
pub fn init_logging(config: &TelemetryConfig) {
    if tracing::dispatcher::has_been_set() {
        tracing::debug!("tracing subscriber already initialized, skipping");
        return;
    }

    let filter = if config.log_filter.is_empty() {
        EnvFilter::new(&config.default_level)
    } else {
        EnvFilter::new(&config.log_filter)
    };

    // NOTE: `tracing-subscriber` JSON formatting requires its `json`
    // feature; the "json" option stays a compact structured format for now.
    let fmt_layer = match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt::layer().compact().boxed(),
        LogFormat::Human => tracing_subscriber::fmt::layer().compact().boxed(),
    };

    // try_init: another thread may have set the subscriber since the
    // has_been_set() check (race in tests)
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

/// Extract request ID from headers
///
/// Checks the configured header name, then x-trace-id.
pub fn extract_request_id(
    headers: &axum::http::HeaderMap,
    config: &TelemetryConfig,
) -> Option<String> {
    if let Some(value) = headers.get(&config.request_id_header) {
        if let Ok(id) = value.to_str() {
            return Some(id.to_string());
        }
    }

    if let Some(value) = headers.get("x-trace-id") {
        if let Ok(id) = value.to_str() {
            return Some(id.to_string());
        }
    }

    None
}

/// Create a request span with correlation context
///
/// Entry point for spans at request boundaries.
pub fn create_request_span(
    operation: &str,
    request_id: Option<&str>,
    analysis_id: Option<u64>,
) -> tracing::Span {
    tracing::info_span!(
        "request",
        operation = operation,
        request_id = request_id,
        analysis_id = analysis_id,
        error_code = tracing::field::Empty, // Will be set on error
    )
}

/// Helper to set error code on a span
pub fn set_span_error_code(span: &tracing::Span, error_code: &str) {
    span.record("error_code", error_code);
}
