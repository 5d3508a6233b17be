//! JSON bodies shaped like Blockfrost responses

use serde_json::{json, Value};

/// Deterministic 64-hex transaction hash
pub fn tx_hash(seed: u32) -> String {
    format!("{:064x}", 0xabcd_0000_u64 + u64::from(seed))
}

/// `amount` array from `(unit, quantity)` pairs
pub fn amounts(pairs: &[(&str, &str)]) -> Value {
    Value::Array(
        pairs
            .iter()
            .map(|(unit, quantity)| json!({ "unit": unit, "quantity": quantity }))
            .collect(),
    )
}

/// `GET /addresses/{address}`
pub fn address_info(address: &str, pairs: &[(&str, &str)], stake_address: Option<&str>) -> Value {
    let address_type = if address.starts_with("addr") { "shelley" } else { "byron" };
    json!({
        "address": address,
        "amount": amounts(pairs),
        "stake_address": stake_address,
        "type": address_type,
        "script": false,
    })
}

/// One entry of `GET /addresses/{address}/utxos`
pub fn utxo(address: &str, tx_hash: &str, output_index: u32, pairs: &[(&str, &str)]) -> Value {
    json!({
        "address": address,
        "tx_hash": tx_hash,
        "tx_index": output_index,
        "output_index": output_index,
        "amount": amounts(pairs),
        "block": "7eb8e27d18686c7db9a18f8bbcfe34e3fed6e047afaa2d969904d15e934847e6",
        "data_hash": null,
        "inline_datum": null,
        "reference_script_hash": null,
    })
}

/// `n` lovelace-only UTXOs with distinct outpoints
pub fn lovelace_utxos(address: &str, n: u32, lovelace_each: &str) -> Vec<Value> {
    (0..n)
        .map(|i| utxo(address, &tx_hash(i), i % 3, &[("lovelace", lovelace_each)]))
        .collect()
}

/// One entry of `GET /addresses/{address}/transactions`
pub fn tx_stub(hash: &str, block_height: u64, tx_index: u32) -> Value {
    json!({
        "tx_hash": hash,
        "tx_index": tx_index,
        "block_height": block_height,
        "block_time": 1_700_000_000_u64 + block_height,
    })
}

/// `GET /txs/{hash}`
pub fn transaction(hash: &str, block_height: u64, fees: &str) -> Value {
    json!({
        "hash": hash,
        "block": "356b7d7dbb696ccd12775c016941057a9dc70898d87a63fc752271bb46856940",
        "block_height": block_height,
        "block_time": 1_700_000_000_u64 + block_height,
        "slot": 42_000_000_u64 + block_height,
        "index": 1,
        "output_amount": amounts(&[("lovelace", "42000000")]),
        "fees": fees,
        "deposit": "0",
        "size": 433,
        "invalid_before": null,
        "invalid_hereafter": "13885913",
        "utxo_count": 4,
        "withdrawal_count": 0,
        "mir_cert_count": 0,
        "delegation_count": 0,
        "stake_cert_count": 0,
        "pool_update_count": 0,
        "pool_retire_count": 0,
        "asset_mint_or_burn_count": 0,
        "redeemer_count": 0,
        "valid_contract": true,
    })
}

/// One input or output of `GET /txs/{hash}/utxos`
pub fn tx_io(address: &str, pairs: &[(&str, &str)]) -> Value {
    json!({
        "address": address,
        "amount": amounts(pairs),
        "output_index": 0,
        "data_hash": null,
    })
}

/// `GET /txs/{hash}/utxos`
pub fn tx_utxos(hash: &str, inputs: Vec<Value>, outputs: Vec<Value>) -> Value {
    json!({
        "hash": hash,
        "inputs": inputs,
        "outputs": outputs,
    })
}

/// Blockfrost error body
pub fn error_body(status_code: u16, error: &str, message: &str) -> Value {
    json!({
        "status_code": status_code,
        "error": error,
        "message": message,
    })
}
