//! # adalens Testing Infrastructure
//!
//! Shared test utilities for the adalens workspace:
//! - Edge case quantities and addresses
//! - Property-based testing strategies
//! - JSON fixtures shaped like Blockfrost responses
//! - A wiremock-backed mock indexer
//!
//! ## Usage
//!
//! ```rust,ignore
//! use adalens_testing::{fixtures, MockIndexer, EdgeCaseAddresses};
//!
//! let indexer = MockIndexer::start().await;
//! let address = EdgeCaseAddresses::testnet(1);
//! indexer
//!     .mount_address_info(&address, fixtures::address_info(&address, &[("lovelace", "5")], None))
//!     .await;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod mock;

pub use mock::MockIndexer;

use bech32::{Bech32, Hrp};
use proptest::prelude::*;

// ============================================================================
// Edge Case Quantities
// ============================================================================

/// Edge case quantity strings for precision and parsing tests
pub struct EdgeCaseQuantities;

impl EdgeCaseQuantities {
    /// Zero
    pub const ZERO: &'static str = "0";

    /// One lovelace
    pub const ONE: &'static str = "1";

    /// Largest integer an f64 represents exactly (2^53 - 1)
    pub const MAX_SAFE_INTEGER: &'static str = "9007199254740991";

    /// 2^53 + 1, the first odd value an f64 rounds away
    pub const ABOVE_SAFE_INTEGER: &'static str = "9007199254740993";

    /// Maximum u64
    pub const MAX_U64: &'static str = "18446744073709551615";

    /// Maximum u128
    pub const MAX_U128: &'static str = "340282366920938463463374607431768211455";

    /// 2^128
    pub const ABOVE_U128: &'static str = "340282366920938463463374607431768211456";

    /// ADA max supply in lovelace
    pub const ADA_MAX_SUPPLY: &'static str = "45000000000000000";

    /// Canonical (no leading zeros) valid quantities
    pub fn valid() -> Vec<&'static str> {
        vec![
            Self::ZERO,
            Self::ONE,
            Self::MAX_SAFE_INTEGER,
            Self::ABOVE_SAFE_INTEGER,
            Self::MAX_U64,
            Self::MAX_U128,
            Self::ABOVE_U128,
            Self::ADA_MAX_SUPPLY,
        ]
    }

    /// Strings that must never be accepted as a quantity
    pub fn malformed() -> Vec<&'static str> {
        vec![
            "",            // Empty
            "-1",          // Negative
            "+1",          // Explicit sign
            "1.5",         // Fractional
            "1e6",         // Exponent
            " 1",          // Leading whitespace
            "1 ",          // Trailing whitespace
            "0x10",        // Hex
            "1_000",       // Separator
            "abc",         // Letters
            "\u{0661}\u{0662}", // Non-ASCII digits
        ]
    }
}

// ============================================================================
// Edge Case Addresses
// ============================================================================

/// Edge case Cardano addresses
pub struct EdgeCaseAddresses;

impl EdgeCaseAddresses {
    /// Icarus-style Byron address
    pub const BYRON_ICARUS: &'static str = "Ae2tdPwUPEZFRbyhz3cpfC2CumGzNkFBN2L42rcUc2yjQpEkxDbkPodpMAi";

    /// Encodes a Shelley enterprise address with a synthetic key hash
    pub fn shelley(hrp: &str, header: u8, seed: u8) -> String {
        let mut data = Vec::with_capacity(29);
        data.push(header);
        data.extend((0u8..28).map(|i| i.wrapping_mul(7).wrapping_add(seed)));
        let hrp = Hrp::parse(hrp).expect("static hrp");
        bech32::encode::<Bech32>(hrp, &data).expect("29 bytes always encode")
    }

    /// Mainnet enterprise address (`addr1...`)
    pub fn mainnet(seed: u8) -> String {
        Self::shelley("addr", 0x61, seed)
    }

    /// Testnet enterprise address (`addr_test1...`)
    pub fn testnet(seed: u8) -> String {
        Self::shelley("addr_test", 0x60, seed)
    }

    /// Testnet stake address (`stake_test1...`)
    pub fn stake_testnet(seed: u8) -> String {
        Self::shelley("stake_test", 0xe0, seed)
    }

    /// Strings that must fail the address pre-check on any network
    pub fn invalid() -> Vec<&'static str> {
        vec![
            "",
            "   ",
            "not_an_address",
            "addr_test1",                                 // No data part
            "addr_test1qqqqqq",                           // Bad checksum
            "Ae2tdPwUPEZ0OIl",                            // Not base58
            "0x742d35Cc6634C0532925a3b844Bc9e7595f5fFb9", // Ethereum
            "bc1qar0srrr7xfkvy5l643lydnw9re59gtzzwf5mdq", // Bitcoin
        ]
    }
}

// ============================================================================
// Property-Based Testing Strategies
// ============================================================================

/// Policy ids shared by the unit strategy so generated lists collide on units
pub const SAMPLE_POLICIES: [&str; 2] = [
    "a0028f350aaabe0545fdcb56b039bfb08e4bb4d8c4d7c3c7d481c235",
    "f0ff48bbb7bbe9d59a40f1ce90e9e9d0ff5002ec48f232b49ca0fb9a",
];

/// Generates base-10 quantity strings up to 40 digits
pub fn quantity_string() -> impl Strategy<Value = String> {
    "[0-9]{1,40}"
}

/// Generates asset units drawn mostly from a small pool
pub fn asset_unit() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => Just("lovelace".to_string()),
        2 => Just(format!("{}{}", SAMPLE_POLICIES[0], hex::encode("HOSKY"))),
        2 => Just(SAMPLE_POLICIES[1].to_string()),
        1 => "[0-9a-f]{56}([0-9a-f]{2}){0,8}",
    ]
}

/// Generates `(unit, quantity)` lists like a UTXO's `amount` field
pub fn asset_list() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec((asset_unit(), quantity_string()), 0..24)
}
