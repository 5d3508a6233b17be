//! Response bodies of the indexer endpoints the lookup consumes.
//!
//! Only the fields the pipeline reads are modelled; unknown fields are
//! ignored. Quantities stay as strings until the ledger parses them.

use serde::Deserialize;

use crate::models::AddressType;
use crate::quantity::AssetAmount;

/// `GET /addresses/{address}`
#[derive(Debug, Clone, Deserialize)]
pub struct AddressInfo {
    pub address: String,
    #[serde(default)]
    pub amount: Vec<AssetAmount>,
    #[serde(default)]
    pub stake_address: Option<String>,
    #[serde(rename = "type", default)]
    pub address_type: AddressType,
    #[serde(default)]
    pub script: bool,
}

/// Entry of `GET /addresses/{address}/utxos`
#[derive(Debug, Clone, Deserialize)]
pub struct AddressUtxo {
    pub tx_hash: String,
    pub output_index: u32,
    pub amount: Vec<AssetAmount>,
}

/// Entry of `GET /addresses/{address}/transactions`
#[derive(Debug, Clone, Deserialize)]
pub struct TxHashStub {
    pub tx_hash: String,
    #[serde(default)]
    pub tx_index: u32,
    #[serde(default)]
    pub block_height: u64,
    #[serde(default)]
    pub block_time: i64,
}

/// `GET /txs/{hash}`
#[derive(Debug, Clone, Deserialize)]
pub struct TxDetails {
    pub hash: String,
    pub block: String,
    pub block_height: u64,
    pub block_time: i64,
    pub slot: u64,
    pub index: u32,
    #[serde(default)]
    pub output_amount: Vec<AssetAmount>,
    pub fees: String,
    #[serde(default = "zero_quantity")]
    pub deposit: String,
    pub size: u64,
    #[serde(default)]
    pub invalid_before: Option<String>,
    #[serde(default)]
    pub invalid_hereafter: Option<String>,
    #[serde(default)]
    pub utxo_count: u32,
    #[serde(default)]
    pub withdrawal_count: u32,
    #[serde(default)]
    pub mir_cert_count: u32,
    #[serde(default)]
    pub delegation_count: u32,
    #[serde(default)]
    pub stake_cert_count: u32,
    #[serde(default)]
    pub pool_update_count: u32,
    #[serde(default)]
    pub pool_retire_count: u32,
    #[serde(default)]
    pub asset_mint_or_burn_count: u32,
    #[serde(default)]
    pub redeemer_count: u32,
    #[serde(default = "default_true")]
    pub valid_contract: bool,
}

/// `GET /txs/{hash}/utxos`
#[derive(Debug, Clone, Deserialize)]
pub struct TxUtxos {
    pub hash: String,
    pub inputs: Vec<TxIo>,
    pub outputs: Vec<TxIo>,
}

/// One input or output of a transaction
#[derive(Debug, Clone, Deserialize)]
pub struct TxIo {
    pub address: String,
    pub amount: Vec<AssetAmount>,
    /// Input or output that only takes effect when scripts fail
    #[serde(default)]
    pub collateral: bool,
    /// Input read by a script but not consumed
    #[serde(default)]
    pub reference: bool,
}

fn zero_quantity() -> String {
    "0".to_string()
}

fn default_true() -> bool {
    true
}
