//! Server configuration module

use clap::Parser;

use crate::config::{
    db::DatabaseConfig,
    observability::{LoggingConfig, ObservabilityConfig},
    pricing::PricingConfig,
    server::ServerRuntimeConfig,
};

pub(crate) mod db;
pub(crate) mod observability;
pub(crate) mod pricing;
pub(crate) mod server;

/// Scrubline JSON API Server configuration
#[derive(Debug, Parser)]
#[command(name = "scrubline-json", about = "Scrubline JSON API Server", long_about = None)]
pub struct ServerConfig {
    /// Server network settings.
    #[command(flatten)]
    pub server: ServerRuntimeConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Observability (traces/metrics) settings.
    #[command(flatten)]
    pub observability: ObservabilityConfig,

    /// Application database settings.
    #[command(flatten)]
    pub database: DatabaseConfig,

    /// Store currency, shipping and tax.
    #[command(flatten)]
    pub pricing: PricingConfig,
}

impl ServerConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Get the socket address for binding
    #[must_use]
    pub fn socket_addr(&self) -> String {
        self.server.socket_addr()
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn defaults_only_require_database_url() -> TestResult {
        let config = ServerConfig::try_parse_from([
            "scrubline-json",
            "--database-url",
            "postgres://scrubline@localhost/scrubline",
        ])?;

        assert_eq!(config.socket_addr(), "0.0.0.0:8698");
        assert_eq!(config.pricing.store_pricing()?.currency_code(), "USD");

        Ok(())
    }

    #[test]
    fn unknown_currency_is_a_configuration_error() -> TestResult {
        let config = ServerConfig::try_parse_from([
            "scrubline-json",
            "--database-url",
            "postgres://scrubline@localhost/scrubline",
            "--currency",
            "XYZ",
        ])?;

        assert!(
            config.pricing.store_pricing().is_err(),
            "XYZ is not an ISO currency"
        );

        Ok(())
    }
}
