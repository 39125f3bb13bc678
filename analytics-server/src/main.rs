//! Analytics Server CLI
//!
//! Run with: `cargo run -p analytics-server -- --help`

use analytics_server::{
    telemetry::{init_logging, TelemetryConfig},
    AnalyticsServer, ServerConfig,
};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::parse();

    let telemetry_config = TelemetryConfig::with_server_config(&config);
    init_logging(&telemetry_config);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %config.listen_addr,
        olap = %config.olap_addr,
        relay_timeout_secs = config.relay_timeout_secs,
        cors = config.cors_enabled,
        log_format = ?telemetry_config.log_format,
        "Starting analytics server"
    );

    let server = AnalyticsServer::new(config);
    server.run().await.map_err(Into::into)
}
