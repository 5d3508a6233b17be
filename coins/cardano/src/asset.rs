use serde::Serialize;

use crate::quantity::LOVELACE_UNIT;

/// Length of a policy id in hex characters (28 bytes)
pub const POLICY_ID_HEX_LEN: usize = 56;

/// A classified asset unit string
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AssetUnit {
    Lovelace,
    Native {
        policy_id: String,
        asset_name_hex: String,
    },
}

impl AssetUnit {
    /// Splits a unit into policy id and asset name.
    ///
    /// Units that are not `lovelace` and too short to carry a policy id are
    /// kept whole as the policy id.
    pub fn parse(unit: &str) -> Self {
        if unit == LOVELACE_UNIT {
            return AssetUnit::Lovelace;
        }
        match (unit.get(..POLICY_ID_HEX_LEN), unit.get(POLICY_ID_HEX_LEN..)) {
            (Some(policy_id), Some(asset_name_hex)) => AssetUnit::Native {
                policy_id: policy_id.to_string(),
                asset_name_hex: asset_name_hex.to_string(),
            },
            _ => AssetUnit::Native {
                policy_id: unit.to_string(),
                asset_name_hex: String::new(),
            },
        }
    }

    pub fn is_lovelace(&self) -> bool {
        matches!(self, AssetUnit::Lovelace)
    }

    pub fn policy_id(&self) -> Option<&str> {
        match self {
            AssetUnit::Lovelace => None,
            AssetUnit::Native { policy_id, .. } => Some(policy_id),
        }
    }

    /// Human-readable name: the asset name as UTF-8 when it decodes to
    /// printable text, otherwise its hex.
    pub fn display_name(&self) -> String {
        match self {
            AssetUnit::Lovelace => LOVELACE_UNIT.to_string(),
            AssetUnit::Native { policy_id, asset_name_hex } if asset_name_hex.is_empty() => {
                policy_id.clone()
            }
            AssetUnit::Native { asset_name_hex, .. } => hex::decode(asset_name_hex)
                .ok()
                .and_then(|bytes| String::from_utf8(bytes).ok())
                .filter(|name| !name.chars().any(char::is_control))
                .unwrap_or_else(|| asset_name_hex.clone()),
        }
    }
}
