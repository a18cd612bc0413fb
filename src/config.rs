//! Configuration loading and validation

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::lifecycle::WaitOptions;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub polling: PollingConfig,
}

/// Ledger-management API endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Bearer token for the platform; empty means unauthenticated (local dev)
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_api_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_network_id")]
    pub network_id: String,
}

/// Wait-loop and pagination defaults
#[derive(Debug, Clone, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub interval_ms: u64,
    #[serde(default = "default_poll_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_base_url() -> String {
    "https://api.chainvault.io/v1".to_string()
}

fn default_api_timeout_ms() -> u64 {
    30_000
}

fn default_network_id() -> String {
    "base-sepolia".to_string()
}

fn default_poll_interval_ms() -> u64 {
    200
}

fn default_poll_timeout_ms() -> u64 {
    10_000
}

fn default_page_size() -> u32 {
    100
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            timeout_ms: default_api_timeout_ms(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            network_id: default_network_id(),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_poll_interval_ms(),
            timeout_ms: default_poll_timeout_ms(),
            page_size: default_page_size(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            network: NetworkConfig::default(),
            polling: PollingConfig::default(),
        }
    }
}

impl PollingConfig {
    /// Wait-loop options derived from this configuration
    pub fn wait_options(&self) -> WaitOptions {
        WaitOptions::new(
            Duration::from_millis(self.interval_ms),
            Duration::from_millis(self.timeout_ms),
        )
    }
}

impl Config {
    /// Load configuration from file and environment variables
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let settings = config::Config::builder()
            // Start with defaults
            .set_default("api.base_url", default_base_url())?
            .set_default("api.timeout_ms", default_api_timeout_ms() as i64)?
            .set_default("network.network_id", default_network_id())?
            .set_default("polling.interval_ms", default_poll_interval_ms() as i64)?
            .set_default("polling.timeout_ms", default_poll_timeout_ms() as i64)?
            // Load from file if exists
            .add_source(config::File::from(path).required(false))
            // Override with environment variables (prefix CHAINVAULT_)
            .add_source(
                config::Environment::with_prefix("CHAINVAULT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        let config: Config = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.api.base_url.is_empty() {
            anyhow::bail!("api.base_url must not be empty");
        }

        if self.polling.interval_ms == 0 {
            anyhow::bail!("polling.interval_ms must be positive");
        }

        if self.polling.timeout_ms < self.polling.interval_ms {
            anyhow::bail!(
                "polling.timeout_ms ({}) must be at least polling.interval_ms ({})",
                self.polling.timeout_ms,
                self.polling.interval_ms
            );
        }

        if self.polling.page_size == 0 || self.polling.page_size > 100 {
            anyhow::bail!("polling.page_size must be between 1 and 100");
        }

        Ok(())
    }

    /// Get masked configuration for display (hide secrets)
    pub fn masked_display(&self) -> String {
        format!(
            r#"Configuration:
  API:
    base_url: {}
    api_key: {}
    timeout: {}ms
  Network:
    network_id: {}
  Polling:
    interval: {}ms
    timeout: {}ms
    page_size: {}
"#,
            self.api.base_url,
            if self.api.api_key.is_empty() {
                "(not set)"
            } else {
                "***"
            },
            self.api.timeout_ms,
            self.network.network_id,
            self.polling.interval_ms,
            self.polling.timeout_ms,
            self.polling.page_size,
        )
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.network.network_id, "base-sepolia");
        assert_eq!(config.polling.interval_ms, 200);
        assert_eq!(config.polling.timeout_ms, 10_000);
    }

    #[test]
    fn test_wait_options_from_polling_config() {
        let options = PollingConfig::default().wait_options();
        assert_eq!(options.interval, Duration::from_millis(200));
        assert_eq!(options.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[network]
network_id = "ethereum-mainnet"

[polling]
interval_ms = 500
timeout_ms = 30000
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.network.network_id, "ethereum-mainnet");
        assert_eq!(config.polling.interval_ms, 500);
        // untouched sections keep their defaults
        assert_eq!(config.api.timeout_ms, 30_000);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = Config::load("does-not-exist.toml").unwrap();
        assert_eq!(config.api.base_url, default_base_url());
    }

    #[test]
    fn test_validation_rejects_zero_interval() {
        let mut config = Config::default();
        config.polling.interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_timeout_below_interval() {
        let mut config = Config::default();
        config.polling.interval_ms = 1_000;
        config.polling.timeout_ms = 500;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_masked_display_hides_api_key() {
        let mut config = Config::default();
        config.api.api_key = "secret-token".to_string();
        let display = config.masked_display();
        assert!(!display.contains("secret-token"));
        assert!(display.contains("***"));
    }
}
