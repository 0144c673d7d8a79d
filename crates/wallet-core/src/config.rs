use chain_sol::PublicKey;
use serde::{Deserialize, Serialize};

use crate::error::WalletError;

/// Subsidizer and time authority: `codeHy87wGD5oMRLG75qKqsSi1vWE3oxNyYmXo5F9YR`
pub const MAINNET_SUBSIDIZER: PublicKey = PublicKey::new([
    0x09, 0x2c, 0x0e, 0x16, 0xb8, 0xaa, 0x61, 0xef, 0x0c, 0xb9, 0x46, 0x41, 0x77, 0x76,
    0x72, 0x36, 0xff, 0x3c, 0x34, 0x7b, 0x52, 0x85, 0xa4, 0x2e, 0x28, 0xcd, 0x9a, 0x7c,
    0x27, 0x3b, 0x59, 0xee,
]);

/// Kin mint: `kinXdEcpDQeHPEuQnqmUgtYykqKGVFq6CeVX5iAHJq6`
pub const MAINNET_KIN_MINT: PublicKey = PublicKey::new([
    0x0b, 0x33, 0x38, 0xa0, 0xab, 0x2c, 0xc8, 0x41, 0xd5, 0xb0, 0x14, 0xbc, 0x6a, 0x3c,
    0xf7, 0x56, 0x29, 0x18, 0x74, 0xb3, 0x19, 0xc9, 0x51, 0x7d, 0x9b, 0xbf, 0xa9, 0xe4,
    0xe9, 0x66, 0x1e, 0xf9,
]);

/// Agora app index stamped into memos by default.
pub const DEFAULT_APP_INDEX: u16 = 268;

/// Well-known protocol accounts and parameters.
///
/// Every field has a mainnet default, so a JSON document only needs to
/// name what it overrides. Public keys are base58 strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProtocolConfig {
    /// Fee payer for every transaction the builder emits.
    pub subsidizer: PublicKey,
    /// Co-signer of timelock operations. Also the close authority.
    pub time_authority: PublicKey,
    pub mint: PublicKey,
    /// Lockout baked into the timelock state address.
    pub lockout_days: u8,
    /// Timelock account layout version baked into the vault address.
    pub vault_data_version: u8,
    pub app_index: u16,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            subsidizer: MAINNET_SUBSIDIZER,
            time_authority: MAINNET_SUBSIDIZER,
            mint: MAINNET_KIN_MINT,
            lockout_days: 21,
            vault_data_version: 3,
            app_index: DEFAULT_APP_INDEX,
        }
    }
}

impl ProtocolConfig {
    pub fn from_json(json: &str) -> Result<Self, WalletError> {
        serde_json::from_str(json).map_err(|e| WalletError::InvalidConfig(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, WalletError> {
        serde_json::to_string_pretty(self).map_err(|e| WalletError::InvalidConfig(e.to_string()))
    }
}
