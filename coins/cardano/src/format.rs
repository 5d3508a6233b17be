//! Display helpers. Nothing here feeds back into balances or records.

use chrono::DateTime;
use num_bigint::BigUint;

use crate::asset::AssetUnit;
use crate::config::LOVELACE_PER_ADA;
use crate::quantity::Quantity;

/// Lovelace as ADA with six decimals, e.g. `1.500000`
pub fn format_ada(lovelace: &Quantity) -> String {
    let per_ada = BigUint::from(LOVELACE_PER_ADA);
    let whole = lovelace.as_biguint() / &per_ada;
    let fraction = (lovelace.as_biguint() % &per_ada).to_string();
    format!("{whole}.{fraction:0>6}")
}

/// Base-10 digits grouped by thousands, e.g. `1,500,000`
pub fn group_digits(quantity: &Quantity) -> String {
    let digits = quantity.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

/// A quantity with its unit: ADA for lovelace, the asset name otherwise
pub fn format_quantity(unit: &str, quantity: &Quantity) -> String {
    match AssetUnit::parse(unit) {
        AssetUnit::Lovelace => format!("{} ADA", format_ada(quantity)),
        native => format!("{} {}", quantity, native.display_name()),
    }
}

/// Keeps `keep` characters at each end of long hashes
pub fn shorten_hash(hash: &str, keep: usize) -> String {
    let len = hash.chars().count();
    if len <= keep * 2 {
        return hash.to_string();
    }
    let head: String = hash.chars().take(keep).collect();
    let tail: String = hash.chars().skip(len - keep).collect();
    format!("{head}...{tail}")
}

/// Unix seconds as a UTC timestamp
pub fn format_timestamp(unix_secs: i64) -> String {
    match DateTime::from_timestamp(unix_secs, 0) {
        Some(time) => time.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => unix_secs.to_string(),
    }
}
