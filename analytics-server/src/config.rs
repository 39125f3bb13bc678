//! Server configuration

use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;

/// Analytics resource server configuration
#[derive(Parser, Debug, Clone)]
#[command(name = "analytics-server")]
#[command(about = "Analytics resource CRUD service and OLAP query relay")]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "ANALYTICS_LISTEN_ADDR", default_value = "0.0.0.0:8000")]
    pub listen_addr: SocketAddr,

    /// Address of the upstream OLAP engine
    #[arg(long, env = "ANALYTICS_OLAP_ADDR", default_value = "127.0.0.1:25335")]
    pub olap_addr: SocketAddr,

    /// Whole-call deadline for one relay request, in seconds
    #[arg(long, env = "ANALYTICS_RELAY_TIMEOUT_SECS", default_value = "30")]
    pub relay_timeout_secs: u64,

    /// Maximum accepted relay response size in bytes (default 64MB)
    #[arg(long, env = "ANALYTICS_RELAY_MAX_RESPONSE_BYTES", default_value = "67108864")]
    pub relay_max_response_bytes: usize,

    /// Request body size limit in bytes (default 10MB)
    #[arg(long, env = "ANALYTICS_BODY_LIMIT", default_value = "10485760")]
    pub body_limit: usize,

    /// Enable CORS (Cross-Origin Resource Sharing)
    #[arg(long, env = "ANALYTICS_CORS_ENABLED", default_value = "true")]
    pub cors_enabled: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "ANALYTICS_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Login page anonymous browser navigations are redirected to
    #[arg(long, env = "ANALYTICS_LOGIN_URL", default_value = "/account/login/")]
    pub login_url: String,

    /// Header the fronting platform gateway sets to the authenticated
    /// principal name. Requests without it are anonymous.
    #[arg(long, env = "ANALYTICS_PRINCIPAL_HEADER", default_value = "x-forwarded-user")]
    pub principal_header: String,
}

impl ServerConfig {
    /// Relay deadline as a `Duration`
    pub fn relay_timeout(&self) -> Duration {
        Duration::from_secs(self.relay_timeout_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8000".parse().unwrap(),
            olap_addr: "127.0.0.1:25335".parse().unwrap(),
            relay_timeout_secs: 30,
            relay_max_response_bytes: 64 * 1024 * 1024,
            body_limit: 10 * 1024 * 1024,
            cors_enabled: true,
            log_level: "info".to_string(),
            login_url: "/account/login/".to_string(),
            principal_header: "x-forwarded-user".to_string(),
        }
    }
}
