//! Application state management
//!
//! The resource service is constructed once with its storage and relay
//! dependencies and handed to the routing layer via axum's `State`
//! extractor; handlers never reach for a process-wide singleton.

use crate::config::ServerConfig;
use crate::telemetry::TelemetryConfig;
use analytics_model::{AnalysisStore, MemoryStore};
use analytics_relay::RelayClient;
use std::sync::Arc;
use std::time::Instant;

/// Application state shared across all request handlers
///
/// Wrapped in `Arc<AppState>` by the router.
pub struct AppState {
    /// Analysis persistence (platform-pluggable seam)
    pub store: Arc<dyn AnalysisStore>,

    /// Client for the upstream OLAP engine
    pub relay: RelayClient,

    /// Server configuration
    pub config: ServerConfig,

    /// Telemetry configuration
    pub telemetry_config: TelemetryConfig,

    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    /// Create new application state from config, backed by the in-memory
    /// store
    pub fn new(config: ServerConfig, telemetry_config: TelemetryConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::with_store(config, telemetry_config, store)
    }

    /// Create application state with an explicit store implementation
    pub fn with_store(
        config: ServerConfig,
        telemetry_config: TelemetryConfig,
        store: Arc<dyn AnalysisStore>,
    ) -> Self {
        let relay = RelayClient::new(config.olap_addr)
            .with_timeout(config.relay_timeout())
            .with_max_response_bytes(config.relay_max_response_bytes);

        Self {
            store,
            relay,
            config,
            telemetry_config,
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
