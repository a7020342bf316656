//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable overrides. The configuration
//! file path defaults to `config.yaml` but can be specified via `-f` flag or `SKYLENS_CONFIG`
//! environment variable. Variables prefixed with `SKYLENS_` override YAML values; nested fields
//! use double underscores, e.g. `SKYLENS_WAREHOUSE__TOKEN=dapi...` sets `warehouse.token`.
//!
//! Durations are humantime strings ("600s", "10m").

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Simple CLI args - just for specifying config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "SKYLENS_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Warehouse connection and execution settings
    pub warehouse: WarehouseConfig,
    /// Conversational agent serving endpoint
    pub agent: AgentConfig,
    /// Statistics cache settings
    pub stats: StatsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            warehouse: WarehouseConfig::default(),
            agent: AgentConfig::default(),
            stats: StatsConfig::default(),
        }
    }
}

/// Databricks-style warehouse API settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct WarehouseConfig {
    /// Workspace base URL, e.g. "https://acme.cloud.databricks.com"
    pub host: Url,
    /// Personal access token for the workspace API
    pub token: String,
    /// Pin statement execution to this warehouse, skipping discovery
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warehouse_id: Option<String>,
    /// Unity Catalog name holding the synced tables
    pub catalog: String,
    /// Schema within the catalog
    pub schema: String,
    /// Server-side wait passed on statement submission
    #[serde(with = "humantime_serde")]
    pub wait_timeout: Duration,
    /// Delay between statement status polls
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
    /// Poll attempts before giving up on a statement
    pub max_polls: u32,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            // Placeholder host; real deployments set warehouse.host.
            host: Url::parse("https://localhost:443").unwrap(),
            token: String::new(),
            warehouse_id: None,
            catalog: "users".to_string(),
            schema: "travel_intel".to_string(),
            wait_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_secs(2),
            max_polls: 30,
        }
    }
}

/// Conversational agent serving endpoint settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AgentConfig {
    /// Workspace base URL hosting the serving endpoint; defaults to the
    /// warehouse host when empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<Url>,
    /// Serving endpoint name, invoked at /serving-endpoints/{name}/invocations
    pub endpoint_name: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            host: None,
            endpoint_name: "travel-concierge".to_string(),
        }
    }
}

/// Statistics cache settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct StatsConfig {
    /// How long a computed snapshot is served before recomputation
    #[serde(with = "humantime_serde")]
    pub freshness_window: Duration,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            freshness_window: Duration::from_secs(600),
        }
    }
}

impl Config {
    /// Load configuration from the YAML file named by `args`, then apply
    /// `SKYLENS_` environment overrides.
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Yaml::file(&args.config))
            .merge(Env::prefixed("SKYLENS_").split("__"))
            .extract()
    }

    /// Base URL for agent invocations.
    pub fn agent_host(&self) -> &Url {
        self.agent.host.as_ref().unwrap_or(&self.warehouse.host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert_eq!(config.port, 8000);
        assert_eq!(config.stats.freshness_window, Duration::from_secs(600));
        assert_eq!(config.warehouse.catalog, "users");
        assert!(config.warehouse.warehouse_id.is_none());
    }

    #[test]
    fn yaml_and_env_override_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.yaml",
                r#"
port: 9000
warehouse:
  token: "dapi-secret"
  warehouse_id: "abc123"
stats:
  freshness_window: "5m"
"#,
            )?;
            jail.set_env("SKYLENS_PORT", "9100");
            jail.set_env("SKYLENS_WAREHOUSE__CATALOG", "prod");

            let args = Args {
                config: "config.yaml".to_string(),
                validate: false,
            };
            let config = Config::load(&args).expect("config should load");
            assert_eq!(config.port, 9100, "env should override yaml");
            assert_eq!(config.warehouse.token, "dapi-secret");
            assert_eq!(config.warehouse.warehouse_id.as_deref(), Some("abc123"));
            assert_eq!(config.warehouse.catalog, "prod");
            assert_eq!(config.stats.freshness_window, Duration::from_secs(300));
            Ok(())
        });
    }

    #[test]
    fn agent_host_falls_back_to_warehouse_host() {
        let config = Config::default();
        assert_eq!(config.agent_host(), &config.warehouse.host);
    }
}
