//! Configuration file

use std::path::Path;

use adalens_cardano::{HttpClientConfig, LookupConfig, Network, RateLimitConfig, ReconcileMode};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Read from the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "adalens.json";

/// Every field is optional; unset fields fall back to the lookup defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    #[serde(default)]
    pub network: Option<Network>,
    #[serde(default)]
    pub project_id: Option<String>,
    /// Indexer URL overriding the network preset
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub reconcile: Option<ReconcileMode>,
    #[serde(default)]
    pub utxo_page_size: Option<u32>,
    #[serde(default)]
    pub max_concurrent_fetches: Option<usize>,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub rate_limit: Option<RateLimitSettings>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitSettings {
    pub requests_per_second: u32,
    pub burst_size: u32,
}

impl CliConfig {
    /// Loads `path`, or the default file if it exists, or an empty config
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::read(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::read(Path::new(DEFAULT_CONFIG_FILE)),
            None => Ok(Self::default()),
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    /// Starter file: the chosen network with the lookup defaults spelled out
    pub fn starter(network: Network) -> Self {
        let defaults = LookupConfig::new(network);
        Self {
            network: Some(network),
            reconcile: Some(defaults.reconcile),
            utxo_page_size: Some(defaults.utxo_page_size),
            max_concurrent_fetches: Some(defaults.max_concurrent_fetches),
            request_timeout_secs: Some(defaults.http.request_timeout_secs),
            ..Self::default()
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
    }

    /// Lookup settings, with `network` taking precedence over the file
    pub fn lookup_config(&self, network: Option<Network>) -> LookupConfig {
        let network = network.or(self.network).unwrap_or_default();
        let mut config = LookupConfig::new(network);
        if let Some(base_url) = &self.base_url {
            config = config.with_base_url(base_url.clone());
        }
        if let Some(mode) = self.reconcile {
            config = config.with_reconcile(mode);
        }
        if let Some(size) = self.utxo_page_size {
            config = config.with_utxo_page_size(size);
        }
        if let Some(n) = self.max_concurrent_fetches {
            config = config.with_max_concurrent_fetches(n);
        }
        if let Some(secs) = self.request_timeout_secs {
            config = config.with_http(HttpClientConfig {
                request_timeout_secs: secs,
                ..HttpClientConfig::default()
            });
        }
        if let Some(rate_limit) = &self.rate_limit {
            config = config.with_rate_limit(RateLimitConfig {
                requests_per_second: rate_limit.requests_per_second,
                burst_size: rate_limit.burst_size,
            });
        }
        config
    }
}
