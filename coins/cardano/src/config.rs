use std::fmt;
use std::str::FromStr;

use adalens_provider::{GatewayConfig, HttpClientConfig, RateLimitConfig};
use serde::{Deserialize, Serialize};

use crate::error::{CardanoError, Result};

/// Cardano network IDs
pub const MAINNET_NETWORK_ID: u8 = 1;
pub const TESTNET_NETWORK_ID: u8 = 0; // Preview/Preprod

/// Lovelace is the smallest unit (1 ADA = 1,000,000 Lovelace)
pub const LOVELACE_PER_ADA: u64 = 1_000_000;

/// Largest page the indexer serves
pub const MAX_PAGE_SIZE: u32 = 100;

pub const DEFAULT_UTXO_PAGE_SIZE: u32 = MAX_PAGE_SIZE;
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 8;

/// Networks with a hosted indexer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    #[default]
    Preview,
    Preprod,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Preview => "preview",
            Network::Preprod => "preprod",
        }
    }

    pub fn is_mainnet(&self) -> bool {
        matches!(self, Network::Mainnet)
    }

    /// Preset for this network
    pub fn config(&self) -> NetworkConfig {
        match self {
            Network::Mainnet => NetworkConfig::mainnet(),
            Network::Preview => NetworkConfig::preview(),
            Network::Preprod => NetworkConfig::preprod(),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = CardanoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "preview" | "testnet" => Ok(Network::Preview),
            "preprod" => Ok(Network::Preprod),
            other => Err(CardanoError::InvalidConfig(format!(
                "unknown network '{other}' (expected mainnet, preview or preprod)"
            ))),
        }
    }
}

/// Cardano network configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub network: Network,
    pub network_id: u8,
    pub name: String,
    pub currency_symbol: String,
    pub decimals: u8,
    pub blockfrost_url: String,
    pub explorer: String,
    pub address_prefix: String,
}

impl NetworkConfig {
    /// Cardano Mainnet configuration
    pub fn mainnet() -> Self {
        NetworkConfig {
            network: Network::Mainnet,
            network_id: MAINNET_NETWORK_ID,
            name: "Cardano Mainnet".to_string(),
            currency_symbol: "ADA".to_string(),
            decimals: 6, // 1 ADA = 1,000,000 Lovelace
            blockfrost_url: "https://cardano-mainnet.blockfrost.io/api/v0".to_string(),
            explorer: "https://cardanoscan.io".to_string(),
            address_prefix: "addr".to_string(),
        }
    }

    /// Cardano Preview Testnet configuration
    pub fn preview() -> Self {
        NetworkConfig {
            network: Network::Preview,
            network_id: TESTNET_NETWORK_ID,
            name: "Cardano Preview".to_string(),
            currency_symbol: "tADA".to_string(),
            decimals: 6,
            blockfrost_url: "https://cardano-preview.blockfrost.io/api/v0".to_string(),
            explorer: "https://preview.cardanoscan.io".to_string(),
            address_prefix: "addr_test".to_string(),
        }
    }

    /// Cardano Preprod Testnet configuration
    pub fn preprod() -> Self {
        NetworkConfig {
            network: Network::Preprod,
            network_id: TESTNET_NETWORK_ID,
            name: "Cardano Preprod".to_string(),
            currency_symbol: "tADA".to_string(),
            decimals: 6,
            blockfrost_url: "https://cardano-preprod.blockfrost.io/api/v0".to_string(),
            explorer: "https://preprod.cardanoscan.io".to_string(),
            address_prefix: "addr_test".to_string(),
        }
    }

    /// Check if mainnet
    pub fn is_mainnet(&self) -> bool {
        self.network_id == MAINNET_NETWORK_ID
    }

    /// Explorer page for a transaction
    pub fn explorer_tx_url(&self, hash: &str) -> String {
        format!("{}/transaction/{hash}", self.explorer)
    }

    /// Explorer page for an address
    pub fn explorer_address_url(&self, address: &str) -> String {
        format!("{}/address/{address}", self.explorer)
    }
}

/// How an address's reported balance is combined with its UTXO set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcileMode {
    /// Units seen in the UTXO set take the UTXO sum; base-only units are kept.
    #[default]
    UtxoAuthoritative,
    /// Base balance plus every UTXO.
    Additive,
}

impl FromStr for ReconcileMode {
    type Err = CardanoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "utxo_authoritative" | "utxo" => Ok(ReconcileMode::UtxoAuthoritative),
            "additive" => Ok(ReconcileMode::Additive),
            other => Err(CardanoError::InvalidConfig(format!("unknown reconcile mode '{other}'"))),
        }
    }
}

/// Settings for a [`crate::CardanoLookup`]
#[derive(Debug, Clone)]
pub struct LookupConfig {
    pub network: Network,
    /// Overrides the network preset's indexer URL
    pub base_url: Option<String>,
    pub reconcile: ReconcileMode,
    pub utxo_page_size: u32,
    pub max_concurrent_fetches: usize,
    pub http: HttpClientConfig,
    pub rate_limit: Option<RateLimitConfig>,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self::new(Network::default())
    }
}

impl LookupConfig {
    pub fn new(network: Network) -> Self {
        Self {
            network,
            base_url: None,
            reconcile: ReconcileMode::default(),
            utxo_page_size: DEFAULT_UTXO_PAGE_SIZE,
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
            http: HttpClientConfig::default(),
            rate_limit: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_reconcile(mut self, mode: ReconcileMode) -> Self {
        self.reconcile = mode;
        self
    }

    pub fn with_utxo_page_size(mut self, size: u32) -> Self {
        self.utxo_page_size = size;
        self
    }

    pub fn with_max_concurrent_fetches(mut self, n: usize) -> Self {
        self.max_concurrent_fetches = n;
        self
    }

    pub fn with_http(mut self, http: HttpClientConfig) -> Self {
        self.http = http;
        self
    }

    pub fn with_rate_limit(mut self, rate_limit: RateLimitConfig) -> Self {
        self.rate_limit = Some(rate_limit);
        self
    }

    /// Indexer URL: the override if set, else the network preset
    pub fn indexer_url(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| self.network.config().blockfrost_url)
    }

    pub fn validate(&self) -> Result<()> {
        if self.utxo_page_size == 0 || self.utxo_page_size > MAX_PAGE_SIZE {
            return Err(CardanoError::InvalidConfig(format!(
                "utxo_page_size must be between 1 and {MAX_PAGE_SIZE}, got {}",
                self.utxo_page_size
            )));
        }
        if self.max_concurrent_fetches == 0 {
            return Err(CardanoError::InvalidConfig(
                "max_concurrent_fetches must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Gateway settings for this lookup
    pub fn gateway_config(&self, api_key: impl Into<String>) -> GatewayConfig {
        let mut gateway = GatewayConfig::new(self.indexer_url(), api_key).with_http(self.http.clone());
        if let Some(rate_limit) = &self.rate_limit {
            gateway = gateway.with_rate_limit(rate_limit.clone());
        }
        gateway
    }
}
