//! Address balance resolution.
//!
//! The indexer reports an address's `amount` alongside its UTXO set. Both are
//! fetched concurrently and combined according to [`ReconcileMode`].

use adalens_provider::{Gateway, QueryParams};
use tracing::{debug, info};

use crate::config::ReconcileMode;
use crate::error::{CardanoError, Result};
use crate::models::{AddressBalance, AddressType};
use crate::quantity::{accumulate, AssetTotals, QuantityLedger};
use crate::wire::{AddressInfo, AddressUtxo};

/// Fetches and reconciles the balance of an already checked address
pub(crate) async fn resolve(
    gateway: &Gateway,
    address: &str,
    utxo_page_size: u32,
    mode: ReconcileMode,
) -> Result<AddressBalance> {
    let (info, utxos) = tokio::try_join!(
        fetch_address_info(gateway, address),
        fetch_utxos(gateway, address, utxo_page_size),
    )?;

    let totals_by_unit = reconcile(&info, &utxos, mode)?;
    info!(
        address,
        units = totals_by_unit.len(),
        utxos = utxos.len(),
        ?mode,
        "resolved address balance"
    );

    let address_type = if info.script && info.address_type == AddressType::Shelley {
        AddressType::Script
    } else {
        info.address_type
    };
    Ok(AddressBalance {
        address: info.address,
        totals_by_unit,
        stake_address: info.stake_address,
        address_type,
        is_script: info.script,
        utxo_count: utxos.len(),
    })
}

async fn fetch_address_info(gateway: &Gateway, address: &str) -> Result<AddressInfo> {
    gateway
        .get(&format!("/addresses/{address}"), &QueryParams::new())
        .await
        .map_err(|e| CardanoError::for_address(address, e))
}

/// Walks every UTXO page until one comes back short
async fn fetch_utxos(gateway: &Gateway, address: &str, page_size: u32) -> Result<Vec<AddressUtxo>> {
    let endpoint = format!("/addresses/{address}/utxos");
    let mut utxos = Vec::new();
    let mut page = 1u32;
    loop {
        let params = QueryParams::new().with("count", page_size).with("page", page);
        let batch: Vec<AddressUtxo> = gateway
            .get(&endpoint, &params)
            .await
            .map_err(|e| CardanoError::for_address(address, e))?;
        let fetched = batch.len();
        utxos.extend(batch);
        if fetched < page_size as usize {
            break;
        }
        page += 1;
    }
    debug!(address, pages = page, utxos = utxos.len(), "fetched UTXO set");
    Ok(utxos)
}

/// Combines the reported balance with the UTXO set.
///
/// With [`ReconcileMode::UtxoAuthoritative`] every unit present in a UTXO
/// takes the UTXO sum and units only in `info.amount` are carried over. With
/// [`ReconcileMode::Additive`] the UTXO sums are added on top of
/// `info.amount`.
pub fn reconcile(info: &AddressInfo, utxos: &[AddressUtxo], mode: ReconcileMode) -> Result<AssetTotals> {
    let base = accumulate(&AssetTotals::new(), &info.amount)?;

    match mode {
        ReconcileMode::Additive => {
            let mut ledger = QuantityLedger::seeded(&base);
            for utxo in utxos {
                ledger.accumulate(&utxo.amount)?;
            }
            Ok(ledger.into_totals())
        }
        ReconcileMode::UtxoAuthoritative => {
            let mut ledger = QuantityLedger::new();
            for utxo in utxos {
                ledger.accumulate(&utxo.amount)?;
            }
            let mut totals = ledger.into_totals();
            for (unit, reported) in base {
                match totals.get(&unit) {
                    Some(from_utxos) if *from_utxos != reported => {
                        debug!(
                            address = %info.address,
                            unit = %unit,
                            reported = %reported,
                            from_utxos = %from_utxos,
                            "reported amount differs from UTXO sum, using UTXO sum"
                        );
                    }
                    Some(_) => {}
                    None => {
                        totals.insert(unit, reported);
                    }
                }
            }
            Ok(totals)
        }
    }
}
