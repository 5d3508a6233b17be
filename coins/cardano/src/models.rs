use std::fmt;
use std::str::FromStr;

use adalens_provider::QueryParams;
use serde::{Deserialize, Serialize};

use crate::config::MAX_PAGE_SIZE;
use crate::error::{CardanoError, Result};
use crate::quantity::{AssetTotals, Quantity, LOVELACE_UNIT};

// ============================================================================
// Balances
// ============================================================================

/// Address era/kind as reported by the indexer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressType {
    #[default]
    Shelley,
    Byron,
    Script,
}

/// Reconciled balance of one address
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressBalance {
    pub address: String,
    pub totals_by_unit: AssetTotals,
    pub stake_address: Option<String>,
    pub address_type: AddressType,
    pub is_script: bool,
    pub utxo_count: usize,
}

impl AddressBalance {
    /// Lovelace total, zero when the address holds none
    pub fn lovelace(&self) -> Quantity {
        self.totals_by_unit.get(LOVELACE_UNIT).cloned().unwrap_or_default()
    }

    /// Every non-lovelace unit with its total
    pub fn native_assets(&self) -> impl Iterator<Item = (&str, &Quantity)> {
        self.totals_by_unit
            .iter()
            .filter(|(unit, _)| unit.as_str() != LOVELACE_UNIT)
            .map(|(unit, quantity)| (unit.as_str(), quantity))
    }
}

// ============================================================================
// Transactions
// ============================================================================

/// A transaction enriched with the amounts that moved in and out of the
/// queried address
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionRecord {
    pub hash: String,
    pub index: u32,
    pub block: String,
    pub block_height: u64,
    pub block_time: i64,
    pub slot: u64,
    pub fees: Quantity,
    pub deposit: Quantity,
    pub size_bytes: u64,
    pub received_amount: AssetTotals,
    pub spent_amount: AssetTotals,
    pub utxo_count: u32,
    pub withdrawal_count: u32,
    pub mir_cert_count: u32,
    pub delegation_count: u32,
    pub stake_cert_count: u32,
    pub pool_update_count: u32,
    pub pool_retire_count: u32,
    pub asset_mint_or_burn_count: u32,
    pub redeemer_count: u32,
    pub valid_contract: bool,
    pub invalid_before: Option<String>,
    pub invalid_hereafter: Option<String>,
}

/// A transaction the pipeline could not enrich
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedTransaction {
    pub hash: String,
    pub error: String,
}

/// Enriched records in hash-list order plus the hashes that were skipped
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransactionPage {
    pub records: Vec<TransactionRecord>,
    pub dropped: Vec<DroppedTransaction>,
}

// ============================================================================
// Transaction query
// ============================================================================

pub const DEFAULT_TX_PAGE: u32 = 1;
pub const DEFAULT_TX_COUNT: u32 = 5;

/// Sort order of the hash list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    Asc,
    #[default]
    Desc,
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Order::Asc => "asc",
            Order::Desc => "desc",
        })
    }
}

impl FromStr for Order {
    type Err = CardanoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Order::Asc),
            "desc" => Ok(Order::Desc),
            other => Err(CardanoError::InvalidQuery(format!("order must be asc or desc, got '{other}'"))),
        }
    }
}

/// Block height with an optional transaction index inside that block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockBound {
    pub height: u64,
    pub index: Option<u32>,
}

impl BlockBound {
    pub fn height(height: u64) -> Self {
        Self { height, index: None }
    }

    pub fn at(height: u64, index: u32) -> Self {
        Self { height, index: Some(index) }
    }
}

impl fmt::Display for BlockBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(f, "{}:{index}", self.height),
            None => write!(f, "{}", self.height),
        }
    }
}

impl FromStr for BlockBound {
    type Err = CardanoError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || CardanoError::InvalidQuery(format!("block bound must be HEIGHT or HEIGHT:INDEX, got '{s}'"));
        let (height, index) = match s.split_once(':') {
            Some((height, index)) => (height, Some(index.parse::<u32>().map_err(|_| invalid())?)),
            None => (s, None),
        };
        let height = height.parse::<u64>().map_err(|_| invalid())?;
        Ok(Self { height, index })
    }
}

/// Pagination and range for a transaction listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionQuery {
    pub page: u32,
    pub count: u32,
    pub order: Order,
    pub from: Option<BlockBound>,
    pub to: Option<BlockBound>,
}

impl Default for TransactionQuery {
    fn default() -> Self {
        Self {
            page: DEFAULT_TX_PAGE,
            count: DEFAULT_TX_COUNT,
            order: Order::default(),
            from: None,
            to: None,
        }
    }
}

impl TransactionQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    pub fn with_order(mut self, order: Order) -> Self {
        self.order = order;
        self
    }

    pub fn from_block(mut self, bound: BlockBound) -> Self {
        self.from = Some(bound);
        self
    }

    pub fn to_block(mut self, bound: BlockBound) -> Self {
        self.to = Some(bound);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.page == 0 {
            return Err(CardanoError::InvalidQuery("page must be at least 1".to_string()));
        }
        if self.count == 0 || self.count > MAX_PAGE_SIZE {
            return Err(CardanoError::InvalidQuery(format!(
                "count must be between 1 and {MAX_PAGE_SIZE}, got {}",
                self.count
            )));
        }
        if let (Some(from), Some(to)) = (self.from, self.to) {
            // A bare height spans the whole block: from its first to its last transaction.
            let first = (from.height, from.index.unwrap_or(0));
            let last = (to.height, to.index.unwrap_or(u32::MAX));
            if first > last {
                return Err(CardanoError::InvalidQuery(format!(
                    "from block {from} is after to block {to}"
                )));
            }
        }
        Ok(())
    }

    /// Query string for `/addresses/{address}/transactions`; unset bounds are omitted
    pub fn to_params(&self) -> QueryParams {
        QueryParams::new()
            .with("count", self.count)
            .with("page", self.page)
            .with("order", self.order)
            .with_opt("from", self.from)
            .with_opt("to", self.to)
    }
}
