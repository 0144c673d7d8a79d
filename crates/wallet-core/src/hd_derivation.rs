//! SLIP-0010 ed25519 key derivation.
//!
//! ed25519 only supports hardened children, so every path component is
//! hardened. The master key is `HMAC-SHA512(key = "ed25519 seed", seed)`;
//! each child is `HMAC-SHA512(chain_code, 0x00 || key || index | 2^31)`.

use std::fmt;
use std::str::FromStr;

use chain_sol::KeyPair;
use hmac::{Hmac, Mac};
use sha2::Sha512;
use tracing::trace;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::WalletError;
use crate::mnemonic::MnemonicPhrase;

type HmacSha512 = Hmac<Sha512>;

pub const HARDENED_OFFSET: u32 = 0x8000_0000;

const SOLANA_COIN_TYPE: u32 = 501;

/// A fully hardened derivation path such as `m/44'/501'/0'/0'`.
///
/// Components are stored without the hardened bit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DerivationPath(Vec<u32>);

impl DerivationPath {
    /// `m/44'/501'/{index}'/0'`, the path wallets use for account `index`.
    pub fn solana(index: u32) -> Result<Self, WalletError> {
        Self::new(vec![44, SOLANA_COIN_TYPE, index, 0])
    }

    pub fn new(components: Vec<u32>) -> Result<Self, WalletError> {
        if let Some(&c) = components.iter().find(|&&c| c >= HARDENED_OFFSET) {
            return Err(WalletError::DerivationInputInvalid(format!(
                "path component {c} is out of the hardened range"
            )));
        }
        Ok(Self(components))
    }

    pub fn components(&self) -> &[u32] {
        &self.0
    }
}

impl FromStr for DerivationPath {
    type Err = WalletError;

    /// Parse `m/44'/501'/0'/0'`. `h` is accepted in place of `'`; a
    /// component without either marker is rejected.
    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: String| WalletError::DerivationInputInvalid(reason);

        let rest = path
            .strip_prefix('m')
            .ok_or_else(|| invalid(format!("{path}: must start with m")))?;
        if rest.is_empty() {
            return Ok(Self(Vec::new()));
        }
        let rest = rest
            .strip_prefix('/')
            .ok_or_else(|| invalid(format!("{path}: expected / after m")))?;

        let components = rest
            .split('/')
            .map(|component| {
                let digits = component
                    .strip_suffix('\'')
                    .or_else(|| component.strip_suffix('h'))
                    .ok_or_else(|| invalid(format!("{component}: ed25519 paths must be hardened")))?;
                digits
                    .parse::<u32>()
                    .map_err(|e| invalid(format!("{component}: {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(components)
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("m")?;
        for component in &self.0 {
            write!(f, "/{component}'")?;
        }
        Ok(())
    }
}

/// A SLIP-0010 node: private key plus chain code. Zeroed on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ExtendedKey {
    key: [u8; 32],
    chain_code: [u8; 32],
}

impl ExtendedKey {
    /// Master node for `seed`. SLIP-0010 requires 16 to 64 bytes of seed.
    pub fn master(seed: &[u8]) -> Result<Self, WalletError> {
        if !(16..=64).contains(&seed.len()) {
            return Err(WalletError::DerivationInputInvalid(format!(
                "seed of {} bytes, expected 16..=64",
                seed.len()
            )));
        }
        Self::from_hmac(b"ed25519 seed", &[seed])
    }

    /// Hardened child `index` (given without the hardened bit).
    pub fn child(&self, index: u32) -> Result<Self, WalletError> {
        if index >= HARDENED_OFFSET {
            return Err(WalletError::DerivationInputInvalid(format!(
                "child index {index} is out of the hardened range"
            )));
        }
        let hardened = (index | HARDENED_OFFSET).to_be_bytes();
        Self::from_hmac(&self.chain_code, &[&[0x00u8][..], &self.key[..], &hardened[..]])
    }

    pub fn derive_path(seed: &[u8], path: &DerivationPath) -> Result<Self, WalletError> {
        path.components()
            .iter()
            .try_fold(Self::master(seed)?, |node, &index| node.child(index))
    }

    pub fn secret_key(&self) -> &[u8; 32] {
        &self.key
    }

    pub fn chain_code(&self) -> &[u8; 32] {
        &self.chain_code
    }

    pub fn keypair(&self) -> KeyPair {
        KeyPair::from_seed(&self.key)
    }

    fn from_hmac(key: &[u8], parts: &[&[u8]]) -> Result<Self, WalletError> {
        let mut mac = HmacSha512::new_from_slice(key)
            .map_err(|e| WalletError::DerivationFailed(e.to_string()))?;
        for part in parts {
            mac.update(part);
        }
        let mut output = mac.finalize().into_bytes();

        let mut node = Self {
            key: [0u8; 32],
            chain_code: [0u8; 32],
        };
        node.key.copy_from_slice(&output[..32]);
        node.chain_code.copy_from_slice(&output[32..]);
        output.as_mut_slice().zeroize();
        Ok(node)
    }
}

impl fmt::Debug for ExtendedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtendedKey")
            .field("public_key", &self.keypair().public_key())
            .finish_non_exhaustive()
    }
}

/// Derive the key pair at `path` from a raw seed.
pub fn derive_keypair(seed: &[u8], path: &DerivationPath) -> Result<KeyPair, WalletError> {
    let keypair = ExtendedKey::derive_path(seed, path)?.keypair();
    trace!(%path, public_key = %keypair.public_key(), "derived key pair");
    Ok(keypair)
}

/// Derive the wallet key pair for account `index` from a phrase.
pub fn keypair_from_mnemonic(
    mnemonic: &MnemonicPhrase,
    passphrase: &str,
    index: u32,
) -> Result<KeyPair, WalletError> {
    let seed = mnemonic.to_seed(passphrase)?;
    derive_keypair(seed.as_bytes(), &DerivationPath::solana(index)?)
}

/// A fresh key pair from the secure random source. Used for one-off
/// accounts such as nonces.
pub fn generate_keypair() -> Result<KeyPair, WalletError> {
    let mut seed: [u8; 32] = crypto_utils::random_bytes_fixed()?;
    let keypair = KeyPair::from_seed(&seed);
    seed.zeroize();
    Ok(keypair)
}
