//! Runtime configuration.
//!
//! Every setting can come from a command-line flag or an environment variable.
//! The CLI builds an [`AppConfig`] once at startup and hands the pieces to the
//! server and the partner client.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use clap::Args;

/// Settings for the HTTP server.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "SERVER_HOST", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "SERVER_PORT", default_value_t = 8080)]
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Settings for the payout partner's disbursement API.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct PartnerConfig {
    /// Base URL of the payout partner, e.g. https://api.bank1.example
    #[arg(long = "partner-hostname", env = "BANK1_HOSTNAME")]
    pub hostname: String,

    /// API key sent in the X-API-Key header
    #[arg(long = "partner-api-key", env = "BANK1_APIKEY", hide_env_values = true)]
    pub api_key: String,

    /// Path of the create-disbursement endpoint, relative to the hostname
    #[arg(
        long = "partner-disbursement-endpoint",
        env = "BANK1_DISBURSEMENTENDPOINT",
        default_value = "disbursements"
    )]
    pub disbursement_endpoint: String,

    /// Request timeout in seconds, at least 1
    #[arg(
        long = "partner-timeout-secs",
        env = "BANK1_TIMEOUTSECS",
        default_value_t = 5,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout_secs: u64,
}

impl PartnerConfig {
    /// Full URL of the create-disbursement endpoint.
    pub fn disbursement_url(&self) -> String {
        format!(
            "{}/{}",
            self.hostname.trim_end_matches('/'),
            self.disbursement_endpoint.trim_start_matches('/')
        )
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Everything the `serve` command needs, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database: String,
    pub server: ServerConfig,
    pub partner: PartnerConfig,
}
