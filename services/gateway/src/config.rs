use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Gateway configuration.
///
/// Every flag can also be set through the environment (a `.env` file is
/// loaded first by the binary).
#[derive(Debug, Clone, Parser)]
#[command(name = "gateway")]
#[command(about = "Risk calculator HTTP gateway", long_about = None)]
pub struct GatewayConfig {
    /// Interface to bind
    #[arg(long, env = "GATEWAY_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// HMAC secret for signing access tokens
    #[arg(
        long,
        env = "JWT_SECRET",
        default_value = "development-secret-change-in-production",
        hide_env_values = true
    )]
    pub jwt_secret: String,

    /// Access token lifetime in hours
    #[arg(long, env = "JWT_EXPIRY_HOURS", default_value_t = 24)]
    pub jwt_expiry_hours: i64,

    /// Requests allowed per client per window
    #[arg(long, env = "RATE_LIMIT_MAX_REQUESTS", default_value_t = 100)]
    pub rate_limit_max_requests: u32,

    /// Fixed window length in seconds
    #[arg(long, env = "RATE_LIMIT_WINDOW_SECS", default_value_t = 60)]
    pub rate_limit_window_secs: u64,

    /// How often expired windows are purged, in seconds
    #[arg(long, env = "RATE_LIMIT_SWEEP_SECS", default_value_t = 300)]
    pub rate_limit_sweep_secs: u64,

    /// Upstream price feed; when unset an in-memory quote table is used
    #[arg(long, env = "PRICE_FEED_URL")]
    pub price_feed_url: Option<String>,

    /// JSON array of quotes to seed the in-memory table with
    #[arg(long, env = "QUOTES_FILE")]
    pub quotes_file: Option<PathBuf>,

    /// Seed an admin account with this email
    #[arg(long, env = "ADMIN_EMAIL")]
    pub admin_email: Option<String>,

    /// Password for the seeded admin account
    #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
    pub admin_password: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            jwt_secret: "development-secret-change-in-production".to_string(),
            jwt_expiry_hours: 24,
            rate_limit_max_requests: 100,
            rate_limit_window_secs: 60,
            rate_limit_sweep_secs: 300,
            price_feed_url: None,
            quotes_file: None,
            admin_email: None,
            admin_password: None,
        }
    }
}

impl GatewayConfig {
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid bind address {}:{}: {}", self.host, self.port, e))
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }

    pub fn rate_limit_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.rate_limit_sweep_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_parser() {
        let parsed = GatewayConfig::parse_from(["gateway", "--port", "9000"]);
        assert_eq!(parsed.port, 9000);
        assert_eq!(
            parsed.rate_limit_max_requests,
            GatewayConfig::default().rate_limit_max_requests
        );
    }

    #[test]
    fn test_socket_addr() {
        let config = GatewayConfig {
            host: "127.0.0.1".into(),
            port: 3000,
            ..Default::default()
        };
        assert_eq!(config.socket_addr().unwrap().port(), 3000);

        let bad = GatewayConfig {
            host: "not a host".into(),
            ..Default::default()
        };
        assert!(bad.socket_addr().is_err());
    }
}
