use std::sync::Arc;

use adalens_provider::Gateway;

use crate::address::CardanoAddress;
use crate::balance;
use crate::config::{LookupConfig, Network};
use crate::error::Result;
use crate::models::{AddressBalance, TransactionPage, TransactionQuery, TransactionRecord};
use crate::transactions;

/// Balance and transaction lookups against one indexer.
///
/// Holds no per-request state; clones share the gateway.
#[derive(Debug, Clone)]
pub struct CardanoLookup {
    gateway: Arc<Gateway>,
    config: LookupConfig,
}

impl CardanoLookup {
    /// Builds a lookup with its own gateway
    pub fn new(config: LookupConfig, api_key: impl Into<String>) -> Result<Self> {
        config.validate()?;
        let gateway = Gateway::new(config.gateway_config(api_key))?;
        Ok(Self {
            gateway: Arc::new(gateway),
            config,
        })
    }

    /// Builds a lookup on a shared gateway
    pub fn with_gateway(config: LookupConfig, gateway: Arc<Gateway>) -> Result<Self> {
        config.validate()?;
        Ok(Self { gateway, config })
    }

    pub fn config(&self) -> &LookupConfig {
        &self.config
    }

    pub fn network(&self) -> Network {
        self.config.network
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    /// Reconciled balance of `address`
    pub async fn resolve_balance(&self, address: &str) -> Result<AddressBalance> {
        CardanoAddress::check(address, self.config.network)?;
        balance::resolve(
            &self.gateway,
            address,
            self.config.utxo_page_size,
            self.config.reconcile,
        )
        .await
    }

    /// Enriched transactions of `address`; hashes that fail to enrich are left out
    pub async fn list_transactions(
        &self,
        address: &str,
        query: &TransactionQuery,
    ) -> Result<Vec<TransactionRecord>> {
        Ok(self.list_transactions_page(address, query).await?.records)
    }

    /// Like [`CardanoLookup::list_transactions`], also reporting the dropped hashes
    pub async fn list_transactions_page(
        &self,
        address: &str,
        query: &TransactionQuery,
    ) -> Result<TransactionPage> {
        CardanoAddress::check(address, self.config.network)?;
        query.validate()?;
        transactions::list(
            &self.gateway,
            address,
            query,
            self.config.max_concurrent_fetches,
        )
        .await
    }
}
