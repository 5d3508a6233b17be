//! # adalens Cardano
//!
//! Consolidated wallet views of a Cardano address, built from a
//! Blockfrost-compatible indexer.
//!
//! ## Features
//!
//! - Exact per-asset balances reconciled against the live UTXO set
//! - Transaction listings enriched with the amounts received and spent by
//!   the address
//! - Bounded, order-preserving fan-out over transaction hashes
//! - Address pre-check before any request is sent
//! - Mainnet, Preview, and Preprod presets
//!
//! ## Example
//!
//! ```rust,no_run
//! use adalens_cardano::{CardanoLookup, LookupConfig, Network, TransactionQuery};
//!
//! # async fn run() -> adalens_cardano::Result<()> {
//! let lookup = CardanoLookup::new(LookupConfig::new(Network::Preview), "preview-project-id")?;
//! let address = "addr_test1vzpwq95z3xyum8vqndgdd9mdnmafh3djcxnc6jemlgdmswcve6tkw";
//!
//! let balance = lookup.resolve_balance(address).await?;
//! println!("Lovelace: {}", balance.lovelace());
//!
//! for tx in lookup.list_transactions(address, &TransactionQuery::default()).await? {
//!     println!("{} received {:?}", tx.hash, tx.received_amount);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Quantities
//!
//! Token supplies routinely exceed 2^64, so every quantity is an arbitrary
//! precision integer ([`Quantity`]) and is serialized as a decimal string.

pub mod address;
pub mod asset;
pub mod balance;
pub mod config;
pub mod error;
pub mod format;
pub mod lookup;
pub mod models;
pub mod quantity;
pub mod session;
pub mod transactions;
pub mod wire;

pub use address::{AddressKind, CardanoAddress};
pub use asset::AssetUnit;
pub use balance::reconcile;
pub use config::{
    LookupConfig, Network, NetworkConfig, ReconcileMode,
    LOVELACE_PER_ADA, MAINNET_NETWORK_ID, TESTNET_NETWORK_ID,
};
pub use error::{CardanoError, ErrorCode, Result};
pub use lookup::CardanoLookup;
pub use models::{
    AddressBalance, AddressType, BlockBound, DroppedTransaction, Order,
    TransactionPage, TransactionQuery, TransactionRecord,
};
pub use quantity::{accumulate, AssetAmount, AssetTotals, Quantity, QuantityError, QuantityLedger};
pub use session::LookupSession;
pub use transactions::build_record;

pub use adalens_provider::{HttpClientConfig, RateLimitConfig};
