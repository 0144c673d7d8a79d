//! Wallet core for timelock custody accounts.
//!
//! Turns a BIP-39 phrase into authority keys, derives the vault and
//! associated token addresses those keys control, and builds the unsigned
//! transactions that move or reclaim funds. Encoding, signing and parsing
//! live in `chain-sol`; nothing here touches the network.

pub mod accounts;
pub mod config;
pub mod error;
pub mod hd_derivation;
pub mod kin;
pub mod mnemonic;
pub mod transaction_builder;

pub use accounts::{
    AccountCluster, AssociatedTokenAccount, Derivation, DerivationKind, TimelockDerivedAccounts,
};
pub use config::{ProtocolConfig, DEFAULT_APP_INDEX, MAINNET_KIN_MINT, MAINNET_SUBSIDIZER};
pub use error::WalletError;
pub use hd_derivation::{derive_keypair, generate_keypair, keypair_from_mnemonic, DerivationPath};
pub use kin::{Kin, QUARKS_PER_KIN};
pub use mnemonic::{MnemonicPhrase, Seed, WordCount};
pub use transaction_builder::{close_dormant_account, close_empty_account, transfer};
