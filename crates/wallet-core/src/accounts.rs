//! Account derivation: from an authority key to the addresses that hold
//! its funds.
//!
//! Everything here is a pure function of its inputs. The same authority,
//! kind and configuration always give the same addresses.

use chain_sol::{
    derive_associated_token_account, derive_state_account, derive_vault_account, KeyPair,
    ProgramDerivedAccount, PublicKey,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ProtocolConfig;
use crate::error::WalletError;
use crate::hd_derivation::keypair_from_mnemonic;
use crate::mnemonic::MnemonicPhrase;

/// How an authority's deposit address is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivationKind {
    /// A vault held by the timelock program.
    Timelock,
    /// The standard associated token account for the configured mint.
    AssociatedTokenAccount,
}

/// The timelock state account for an owner and the vault it controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimelockDerivedAccounts {
    pub owner: PublicKey,
    pub state: ProgramDerivedAccount,
    pub vault: ProgramDerivedAccount,
}

impl TimelockDerivedAccounts {
    pub fn new(owner: &PublicKey, config: &ProtocolConfig) -> Result<Self, WalletError> {
        let state = derive_state_account(
            &config.mint,
            &config.time_authority,
            owner,
            config.lockout_days,
        )?;
        let vault = derive_vault_account(&state.public_key, config.vault_data_version)?;

        Ok(Self {
            owner: *owner,
            state,
            vault,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssociatedTokenAccount {
    pub owner: PublicKey,
    pub mint: PublicKey,
    pub ata: ProgramDerivedAccount,
}

impl AssociatedTokenAccount {
    pub fn new(owner: &PublicKey, mint: &PublicKey) -> Result<Self, WalletError> {
        Ok(Self {
            owner: *owner,
            mint: *mint,
            ata: derive_associated_token_account(owner, mint)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Derivation {
    Timelock(TimelockDerivedAccounts),
    AssociatedToken(AssociatedTokenAccount),
}

impl Derivation {
    pub fn derive(
        owner: &PublicKey,
        kind: DerivationKind,
        config: &ProtocolConfig,
    ) -> Result<Self, WalletError> {
        Ok(match kind {
            DerivationKind::Timelock => {
                Derivation::Timelock(TimelockDerivedAccounts::new(owner, config)?)
            }
            DerivationKind::AssociatedTokenAccount => {
                Derivation::AssociatedToken(AssociatedTokenAccount::new(owner, &config.mint)?)
            }
        })
    }

    pub fn kind(&self) -> DerivationKind {
        match self {
            Derivation::Timelock(_) => DerivationKind::Timelock,
            Derivation::AssociatedToken(_) => DerivationKind::AssociatedTokenAccount,
        }
    }

    /// The token account that receives funds: the vault or the ATA.
    pub fn deposit_address(&self) -> PublicKey {
        match self {
            Derivation::Timelock(accounts) => accounts.vault.public_key,
            Derivation::AssociatedToken(account) => account.ata.public_key,
        }
    }
}

/// An authority key pair and the accounts derived from it.
///
/// Two clusters are equal when their index, authority public key and
/// derivation kind match.
#[derive(Debug, Clone)]
pub struct AccountCluster {
    pub index: u32,
    pub authority: KeyPair,
    pub derivation: Derivation,
}

impl AccountCluster {
    pub fn new(
        index: u32,
        authority: KeyPair,
        kind: DerivationKind,
        config: &ProtocolConfig,
    ) -> Result<Self, WalletError> {
        let derivation = Derivation::derive(&authority.public_key(), kind, config)?;
        debug!(
            index,
            ?kind,
            authority = %authority.public_key(),
            deposit = %derivation.deposit_address(),
            "derived account cluster"
        );

        Ok(Self {
            index,
            authority,
            derivation,
        })
    }

    /// Derive the authority at `m/44'/501'/{index}'/0'` and its accounts.
    pub fn from_mnemonic(
        mnemonic: &MnemonicPhrase,
        passphrase: &str,
        index: u32,
        kind: DerivationKind,
        config: &ProtocolConfig,
    ) -> Result<Self, WalletError> {
        let authority = keypair_from_mnemonic(mnemonic, passphrase, index)?;
        Self::new(index, authority, kind, config)
    }

    pub fn authority_public_key(&self) -> PublicKey {
        self.authority.public_key()
    }

    pub fn kind(&self) -> DerivationKind {
        self.derivation.kind()
    }

    pub fn deposit_address(&self) -> PublicKey {
        self.derivation.deposit_address()
    }

    /// The timelock accounts, if this cluster is a timelock vault.
    pub fn timelock_accounts(&self) -> Option<&TimelockDerivedAccounts> {
        match &self.derivation {
            Derivation::Timelock(accounts) => Some(accounts),
            Derivation::AssociatedToken(_) => None,
        }
    }
}

impl PartialEq for AccountCluster {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
            && self.authority_public_key() == other.authority_public_key()
            && self.kind() == other.kind()
    }
}

impl Eq for AccountCluster {}
