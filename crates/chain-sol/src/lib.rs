//! Ledger wire format, instructions and program support for the wallet.
//!
//! This crate builds, signs, encodes and decodes transactions for the
//! timelock custody program and the handful of system programs it leans
//! on, without pulling in `solana-sdk` (which drags in tokio and 200+
//! transitive dependencies).
//!
//! Instead the compact binary wire format is implemented by hand, using
//! `ed25519-dalek` for signing, `curve25519-dalek` for the on-curve test
//! behind program-derived addresses, and `bs58` for Base58 text.
//!
//! Layering, leaves first:
//!
//! - [`keys`]: public keys, signatures, hashes and key pairs
//! - [`short_vec`]: compact-length codec and the bounded wire reader
//! - [`instruction`] and [`programs`]: typed build/parse per program
//! - [`message`] and [`transaction`]: the full transaction codec

pub mod agora_memo;
pub mod error;
pub mod instruction;
pub mod keys;
pub mod message;
pub mod pda;
pub mod programs;
pub mod short_vec;
pub mod transaction;

// Re-export key public types for ergonomic imports.
pub use agora_memo::{AgoraMemo, TransferType};
pub use error::SolError;
pub use instruction::{
    AccountMeta, Command, CompiledInstruction, Instruction, InstructionType, Program,
};
pub use keys::{Hash, KeyPair, PublicKey, Signature};
pub use message::{Message, MessageHeader};
pub use pda::{create_program_address, find_program_address, ProgramDerivedAccount};
pub use programs::associated_token::{derive_associated_token_account, ASSOCIATED_TOKEN_PROGRAM_ID};
pub use programs::memo::MEMO_PROGRAM_ID;
pub use programs::system::SYSTEM_PROGRAM_ID;
pub use programs::timelock::{derive_state_account, derive_vault_account, TIMELOCK_PROGRAM_ID};
pub use programs::token::TOKEN_PROGRAM_ID;
pub use programs::ProgramInstruction;
pub use short_vec::{decode_length, encode_length};
pub use transaction::Transaction;
