//! Terminal rendering

use adalens_cardano::format::{format_ada, format_quantity, format_timestamp, group_digits, shorten_hash};
use adalens_cardano::{AddressBalance, AssetTotals, AssetUnit, NetworkConfig, TransactionPage};

pub fn render_balance(balance: &AddressBalance, network: &NetworkConfig) -> String {
    let lovelace = balance.lovelace();
    let mut out = String::new();
    out.push_str(&format!("Address:  {}\n", shorten_hash(&balance.address, 20)));
    out.push_str(&format!(
        "Type:     {:?}{}\n",
        balance.address_type,
        if balance.is_script { " (script)" } else { "" }
    ));
    if let Some(stake) = &balance.stake_address {
        out.push_str(&format!("Stake:    {}\n", shorten_hash(stake, 12)));
    }
    out.push_str(&format!("UTXOs:    {}\n", balance.utxo_count));
    out.push_str(&format!(
        "Balance:  {} {} ({} lovelace)\n",
        format_ada(&lovelace),
        network.currency_symbol,
        group_digits(&lovelace)
    ));

    let assets: Vec<_> = balance.native_assets().collect();
    if !assets.is_empty() {
        out.push_str(&format!("Assets:   {}\n", assets.len()));
        for (unit, quantity) in assets {
            let policy = AssetUnit::parse(unit).policy_id().map(|p| shorten_hash(p, 6)).unwrap_or_default();
            out.push_str(&format!("  {}  (policy {policy})\n", format_quantity(unit, quantity)));
        }
    }
    out.push_str(&format!("Explorer: {}\n", network.explorer_address_url(&balance.address)));
    out
}

fn render_totals(totals: &AssetTotals) -> String {
    if totals.is_empty() {
        return "-".to_string();
    }
    totals
        .iter()
        .map(|(unit, quantity)| format_quantity(unit, quantity))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn render_transactions(page: &TransactionPage, network: &NetworkConfig) -> String {
    let mut out = String::new();
    if page.records.is_empty() && page.dropped.is_empty() {
        out.push_str("No transactions on this page.\n");
    }
    for record in &page.records {
        out.push_str(&format!(
            "{}  block {}  {}{}\n",
            shorten_hash(&record.hash, 12),
            record.block_height,
            format_timestamp(record.block_time),
            if record.valid_contract { "" } else { "  [script failed]" }
        ));
        out.push_str(&format!("  received: {}\n", render_totals(&record.received_amount)));
        out.push_str(&format!("  spent:    {}\n", render_totals(&record.spent_amount)));
        out.push_str(&format!(
            "  fee:      {} {}  size: {} bytes\n",
            format_ada(&record.fees),
            network.currency_symbol,
            record.size_bytes
        ));
        out.push_str(&format!("  {}\n", network.explorer_tx_url(&record.hash)));
    }
    if !page.dropped.is_empty() {
        out.push_str(&format!("\n{} transaction(s) could not be loaded:\n", page.dropped.len()));
        for dropped in &page.dropped {
            out.push_str(&format!("  {}: {}\n", shorten_hash(&dropped.hash, 12), dropped.error));
        }
    }
    out
}
