//! Transaction enrichment.
//!
//! The indexer lists bare hashes for an address; each hash is expanded into a
//! [`TransactionRecord`] from its metadata and its inputs/outputs. Hashes are
//! processed with bounded fan-out and come back in hash-list order. A hash
//! that fails to enrich is dropped from the records, not the whole page.

use adalens_provider::{Gateway, QueryParams};
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::error::{CardanoError, Result};
use crate::models::{DroppedTransaction, TransactionPage, TransactionQuery, TransactionRecord};
use crate::quantity::{AssetTotals, Quantity, QuantityLedger};
use crate::wire::{TxDetails, TxHashStub, TxIo, TxUtxos};

/// Lists and enriches one page of an already checked address's transactions
pub(crate) async fn list(
    gateway: &Gateway,
    address: &str,
    query: &TransactionQuery,
    max_concurrent_fetches: usize,
) -> Result<TransactionPage> {
    let stubs: Vec<TxHashStub> = gateway
        .get(&format!("/addresses/{address}/transactions"), &query.to_params())
        .await
        .map_err(|e| CardanoError::for_address(address, e))?;

    if stubs.is_empty() {
        debug!(address, page = query.page, "no transactions on page");
        return Ok(TransactionPage::default());
    }

    let requested = stubs.len();
    let results: Vec<(String, Result<TransactionRecord>)> = stream::iter(stubs)
        .map(|stub| async move {
            let record = enrich(gateway, address, &stub.tx_hash).await;
            (stub.tx_hash, record)
        })
        .buffered(max_concurrent_fetches.max(1))
        .collect()
        .await;

    let mut page = TransactionPage::default();
    for (hash, result) in results {
        match result {
            Ok(record) => page.records.push(record),
            Err(err) => {
                warn!(address, tx_hash = %hash, error = %err, "dropping transaction that could not be enriched");
                page.dropped.push(DroppedTransaction {
                    hash,
                    error: err.to_string(),
                });
            }
        }
    }

    info!(
        address,
        requested,
        fetched = page.records.len(),
        dropped = page.dropped.len(),
        "enriched transaction page"
    );
    Ok(page)
}

/// Length of a transaction hash in hex characters (32 bytes)
const TX_HASH_HEX_LEN: usize = 64;

/// Whether `hash` is safe to place in a request path
fn is_tx_hash(hash: &str) -> bool {
    hash.len() == TX_HASH_HEX_LEN && hash.bytes().all(|b| b.is_ascii_hexdigit())
}

async fn enrich(gateway: &Gateway, address: &str, hash: &str) -> Result<TransactionRecord> {
    if !is_tx_hash(hash) {
        return Err(CardanoError::MalformedResponse(format!(
            "indexer listed {hash:?}, which is not a transaction hash"
        )));
    }
    let details_endpoint = format!("/txs/{hash}");
    let utxos_endpoint = format!("/txs/{hash}/utxos");
    let no_params = QueryParams::new();

    let (details, utxos) = tokio::try_join!(
        gateway.get::<TxDetails>(&details_endpoint, &no_params),
        gateway.get::<TxUtxos>(&utxos_endpoint, &no_params),
    )?;
    build_record(details, &utxos, address)
}

/// Builds a record from a transaction's metadata and inputs/outputs.
///
/// `received_amount` sums the outputs paying `address` that reached the chain:
/// regular outputs of a valid transaction, the collateral return of a failed
/// one. The transaction's own `output_amount` is never used. `spent_amount`
/// follows the same rule for inputs and never counts reference inputs.
pub fn build_record(details: TxDetails, utxos: &TxUtxos, address: &str) -> Result<TransactionRecord> {
    if utxos.hash != details.hash {
        return Err(CardanoError::MalformedResponse(format!(
            "UTXOs for {} returned for transaction {}",
            utxos.hash, details.hash
        )));
    }

    let received_amount = received_by(&utxos.outputs, address, details.valid_contract)?;
    let spent_amount = spent_by(&utxos.inputs, address, details.valid_contract)?;
    let fees: Quantity = details.fees.parse()?;
    let deposit: Quantity = details.deposit.parse()?;

    Ok(TransactionRecord {
        hash: details.hash,
        index: details.index,
        block: details.block,
        block_height: details.block_height,
        block_time: details.block_time,
        slot: details.slot,
        fees,
        deposit,
        size_bytes: details.size,
        received_amount,
        spent_amount,
        utxo_count: details.utxo_count,
        withdrawal_count: details.withdrawal_count,
        mir_cert_count: details.mir_cert_count,
        delegation_count: details.delegation_count,
        stake_cert_count: details.stake_cert_count,
        pool_update_count: details.pool_update_count,
        pool_retire_count: details.pool_retire_count,
        asset_mint_or_burn_count: details.asset_mint_or_burn_count,
        redeemer_count: details.redeemer_count,
        valid_contract: details.valid_contract,
        invalid_before: details.invalid_before,
        invalid_hereafter: details.invalid_hereafter,
    })
}

/// Sums the outputs paying `address` that a transaction with the given
/// script outcome actually created
pub fn received_by(outputs: &[TxIo], address: &str, valid_contract: bool) -> Result<AssetTotals> {
    let mut ledger = QuantityLedger::new();
    for output in outputs
        .iter()
        .filter(|o| o.address == address && o.collateral != valid_contract)
    {
        ledger.accumulate(&output.amount)?;
    }
    Ok(ledger.into_totals())
}

fn spent_by(inputs: &[TxIo], address: &str, valid_contract: bool) -> Result<AssetTotals> {
    let mut ledger = QuantityLedger::new();
    for input in inputs
        .iter()
        .filter(|i| i.address == address && !i.reference && i.collateral != valid_contract)
    {
        ledger.accumulate(&input.amount)?;
    }
    Ok(ledger.into_totals())
}
