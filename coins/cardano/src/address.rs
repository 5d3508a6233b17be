use serde::{Deserialize, Serialize};

use crate::config::{Network, MAINNET_NETWORK_ID, TESTNET_NETWORK_ID};
use crate::error::{CardanoError, Result};

const MAINNET_HRP: &str = "addr";
const TESTNET_HRP: &str = "addr_test";
const STAKE_HRPS: [&str; 2] = ["stake", "stake_test"];

/// Byron-era base58 prefixes (Icarus and Daedalus)
const BYRON_PREFIXES: [&str; 2] = ["Ae2", "DdzFF"];

/// Header type nibble for reward (stake) addresses
const REWARD_HEADER_TYPES: [u8; 2] = [0b1110, 0b1111];

/// Address encoding recognised by the pre-check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressKind {
    /// Bech32 payment address (`addr1...` / `addr_test1...`)
    Shelley,
    /// Legacy base58 address
    Byron,
}

/// Syntactic address checks made before any request is sent.
///
/// This is a pre-check, not on-chain validation: a well-formed address that
/// has never been used still passes and is reported by the indexer as not
/// found.
pub struct CardanoAddress;

impl CardanoAddress {
    /// Checks `address` is a payment address for `network`
    pub fn check(address: &str, network: Network) -> Result<AddressKind> {
        let trimmed = address.trim();
        if trimmed.is_empty() {
            return Err(CardanoError::invalid_address(address, "address is empty"));
        }
        if trimmed.len() != address.len() {
            return Err(CardanoError::invalid_address(address, "address has surrounding whitespace"));
        }

        if BYRON_PREFIXES.iter().any(|p| address.starts_with(p)) {
            return Self::check_byron(address);
        }

        if address.starts_with(MAINNET_HRP) || STAKE_HRPS.iter().any(|p| address.starts_with(p)) {
            return Self::check_shelley(address, network);
        }

        Err(CardanoError::invalid_address(
            address,
            format!(
                "expected a '{}1' or Byron address",
                Self::expected_hrp(network)
            ),
        ))
    }

    /// Network-agnostic form of [`CardanoAddress::check`]
    pub fn validate(address: &str) -> bool {
        [Network::Mainnet, Network::Preview]
            .into_iter()
            .any(|network| Self::check(address, network).is_ok())
    }

    fn expected_hrp(network: Network) -> &'static str {
        if network.is_mainnet() {
            MAINNET_HRP
        } else {
            TESTNET_HRP
        }
    }

    fn check_shelley(address: &str, network: Network) -> Result<AddressKind> {
        let (hrp, data) = bech32::decode(address)
            .map_err(|e| CardanoError::invalid_address(address, format!("invalid bech32 encoding: {e}")))?;
        let hrp = hrp.as_str();

        if STAKE_HRPS.contains(&hrp) {
            return Err(CardanoError::invalid_address(
                address,
                "stake addresses hold no UTXOs; use a payment address",
            ));
        }

        let address_is_mainnet = match hrp {
            MAINNET_HRP => true,
            TESTNET_HRP => false,
            other => {
                return Err(CardanoError::invalid_address(
                    address,
                    format!("unexpected prefix '{other}'"),
                ))
            }
        };
        if address_is_mainnet != network.is_mainnet() {
            return Err(CardanoError::invalid_address(
                address,
                format!(
                    "address belongs to {}, lookup is on {network}",
                    if address_is_mainnet { "mainnet" } else { "a testnet" }
                ),
            ));
        }

        let header = *data
            .first()
            .ok_or_else(|| CardanoError::invalid_address(address, "address has no payload"))?;
        if REWARD_HEADER_TYPES.contains(&(header >> 4)) {
            return Err(CardanoError::invalid_address(
                address,
                "stake addresses hold no UTXOs; use a payment address",
            ));
        }
        let expected_id = if network.is_mainnet() { MAINNET_NETWORK_ID } else { TESTNET_NETWORK_ID };
        if header & 0x0F != expected_id {
            return Err(CardanoError::invalid_address(
                address,
                format!("header network id {} does not match {network}", header & 0x0F),
            ));
        }

        Ok(AddressKind::Shelley)
    }

    fn check_byron(address: &str) -> Result<AddressKind> {
        bs58::decode(address)
            .into_vec()
            .map_err(|e| CardanoError::invalid_address(address, format!("invalid base58 encoding: {e}")))?;
        Ok(AddressKind::Byron)
    }
}
