//! Analytics HTTP Server
//!
//! CRUD service for saved analyses plus a stateless query relay to an
//! external OLAP engine. Authentication and persistence belong to the
//! hosting platform; the server takes the principal from a trusted gateway
//! header and the store through a pluggable trait.
//!
//! # Example
//!
//! ```ignore
//! use analytics_server::{AnalyticsServer, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig::default();
//!     let server = AnalyticsServer::new(config);
//!     server.run().await.unwrap();
//! }
//! ```

pub mod config;
pub mod error;
pub mod principal;
pub mod routes;
pub mod state;
pub mod telemetry;

pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use principal::MaybePrincipal;
pub use state::AppState;
pub use telemetry::{init_logging, TelemetryConfig};

use analytics_model::AnalysisStore;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

/// Analytics HTTP Server
pub struct AnalyticsServer {
    /// Application state
    state: Arc<AppState>,
    /// Configured router
    router: Router,
}

impl AnalyticsServer {
    /// Create a new server with the given configuration, backed by the
    /// in-memory store
    pub fn new(config: ServerConfig) -> Self {
        let telemetry_config = TelemetryConfig::with_server_config(&config);
        let state = Arc::new(AppState::new(config, telemetry_config));
        let router = routes::build_router(state.clone());

        Self { state, router }
    }

    /// Create a new server with an explicit store implementation
    pub fn with_store(config: ServerConfig, store: Arc<dyn AnalysisStore>) -> Self {
        let telemetry_config = TelemetryConfig::with_server_config(&config);
        let state = Arc::new(AppState::with_store(config, telemetry_config, store));
        let router = routes::build_router(state.clone());

        Self { state, router }
    }

    /// Get a reference to the application state
    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// Get the router for testing
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server
    pub async fn run(self) -> std::result::Result<(), std::io::Error> {
        let addr = self.state.config.listen_addr;
        let listener = TcpListener::bind(addr).await?;

        info!(
            addr = %addr,
            olap = %self.state.config.olap_addr,
            cors = self.state.config.cors_enabled,
            "Analytics server starting"
        );

        axum::serve(listener, self.router).await
    }
}
