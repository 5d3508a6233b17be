//! Exact per-asset quantity accumulation.
//!
//! Quantities arrive from the indexer as base-10 strings and may exceed any
//! fixed-width integer (total token supplies routinely pass 2^64). Everything
//! here works on [`BigUint`], so a fold never loses precision and never
//! depends on the order UTXOs are visited in.

use num_bigint::BigUint;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

/// Unit name of the native currency
pub const LOVELACE_UNIT: &str = "lovelace";

/// A quantity string that is not a non-negative base-10 integer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantityError {
    pub value: String,
}

impl QuantityError {
    pub fn new(value: impl Into<String>) -> Self {
        Self { value: value.into() }
    }
}

impl fmt::Display for QuantityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "malformed quantity '{}'", self.value)
    }
}

impl std::error::Error for QuantityError {}

/// Arbitrary-precision, non-negative asset quantity
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quantity(BigUint);

impl Quantity {
    pub fn zero() -> Self {
        Self(BigUint::default())
    }

    pub fn is_zero(&self) -> bool {
        self.0 == BigUint::default()
    }

    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    pub fn into_biguint(self) -> BigUint {
        self.0
    }
}

impl FromStr for Quantity {
    type Err = QuantityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // BigUint::from_str also takes a '+' sign and '_' separators.
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(QuantityError::new(s));
        }
        BigUint::parse_bytes(s.as_bytes(), 10)
            .map(Quantity)
            .ok_or_else(|| QuantityError::new(s))
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<u64> for Quantity {
    fn from(value: u64) -> Self {
        Self(BigUint::from(value))
    }
}

impl From<BigUint> for Quantity {
    fn from(value: BigUint) -> Self {
        Self(value)
    }
}

impl Add for Quantity {
    type Output = Quantity;

    fn add(self, rhs: Quantity) -> Quantity {
        Quantity(self.0 + rhs.0)
    }
}

impl AddAssign<&Quantity> for Quantity {
    fn add_assign(&mut self, rhs: &Quantity) {
        self.0 += &rhs.0;
    }
}

impl Serialize for Quantity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Quantity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One `{unit, quantity}` entry as the indexer reports it.
///
/// The quantity stays a string until it is folded through a ledger, so a bad
/// value surfaces as a malformed quantity rather than a malformed response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetAmount {
    pub unit: String,
    pub quantity: String,
}

impl AssetAmount {
    pub fn new(unit: impl Into<String>, quantity: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            quantity: quantity.into(),
        }
    }

    pub fn lovelace(quantity: impl Into<String>) -> Self {
        Self::new(LOVELACE_UNIT, quantity)
    }
}

/// Per-unit totals, one entry per distinct unit
pub type AssetTotals = BTreeMap<String, Quantity>;

/// Folds `incoming` into a copy of `existing`.
///
/// `existing` is never modified; on a malformed quantity the whole fold fails.
pub fn accumulate(existing: &AssetTotals, incoming: &[AssetAmount]) -> Result<AssetTotals, QuantityError> {
    let mut ledger = QuantityLedger::seeded(existing);
    ledger.accumulate(incoming)?;
    Ok(ledger.into_totals())
}

/// Running per-unit totals
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuantityLedger {
    totals: AssetTotals,
}

impl QuantityLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing set of totals
    pub fn seeded(totals: &AssetTotals) -> Self {
        Self {
            totals: totals.clone(),
        }
    }

    /// Adds one parsed quantity to `unit`
    pub fn add(&mut self, unit: &str, quantity: &Quantity) {
        match self.totals.get_mut(unit) {
            Some(total) => *total += quantity,
            None => {
                self.totals.insert(unit.to_string(), quantity.clone());
            }
        }
    }

    /// Parses and adds one quantity string to `unit`
    pub fn credit(&mut self, unit: &str, quantity: &str) -> Result<(), QuantityError> {
        let quantity: Quantity = quantity.parse()?;
        self.add(unit, &quantity);
        Ok(())
    }

    /// Folds a list of asset amounts.
    ///
    /// All quantities are parsed before any is applied, so a failure leaves
    /// the ledger untouched.
    pub fn accumulate<'a, I>(&mut self, assets: I) -> Result<(), QuantityError>
    where
        I: IntoIterator<Item = &'a AssetAmount>,
    {
        let parsed = assets
            .into_iter()
            .map(|asset| Ok((asset.unit.as_str(), asset.quantity.parse::<Quantity>()?)))
            .collect::<Result<Vec<_>, QuantityError>>()?;
        for (unit, quantity) in parsed {
            self.add(unit, &quantity);
        }
        Ok(())
    }

    /// Adds every total of `other`
    pub fn merge(&mut self, other: &QuantityLedger) {
        for (unit, quantity) in &other.totals {
            self.add(unit, quantity);
        }
    }

    pub fn get(&self, unit: &str) -> Option<&Quantity> {
        self.totals.get(unit)
    }

    pub fn contains(&self, unit: &str) -> bool {
        self.totals.contains_key(unit)
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn totals(&self) -> &AssetTotals {
        &self.totals
    }

    pub fn into_totals(self) -> AssetTotals {
        self.totals
    }
}
