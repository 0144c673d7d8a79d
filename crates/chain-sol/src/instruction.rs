//! Instructions, account references and the per-program build/parse
//! contract.
//!
//! Each on-ledger program is a unit type implementing [`Program`]. Programs
//! that multiplex several operations declare a [`Command`] enum whose
//! discriminant leads the instruction data with a fixed width. Concrete
//! instruction structs implement [`InstructionType`] so they can be built
//! into, and parsed back out of, a plain [`Instruction`].

use std::cmp::Ordering;
use std::fmt;

use crate::error::SolError;
use crate::keys::PublicKey;
use crate::short_vec::{encode_buffer, WireReader};

// ---------------------------------------------------------------------------
// AccountMeta
// ---------------------------------------------------------------------------

/// A single account reference in an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountMeta {
    pub public_key: PublicKey,
    pub is_signer: bool,
    pub is_writable: bool,
    /// Fee payer. Always sorted to index 0 of a message.
    pub is_payer: bool,
    /// Invoked program. Sorted after every non-program account.
    pub is_program: bool,
}

impl AccountMeta {
    pub fn payer(public_key: PublicKey) -> Self {
        Self {
            public_key,
            is_signer: true,
            is_writable: true,
            is_payer: true,
            is_program: false,
        }
    }

    pub fn writable(public_key: PublicKey) -> Self {
        Self::new(public_key, false, true)
    }

    pub fn writable_signer(public_key: PublicKey) -> Self {
        Self::new(public_key, true, true)
    }

    pub fn readonly(public_key: PublicKey) -> Self {
        Self::new(public_key, false, false)
    }

    pub fn readonly_signer(public_key: PublicKey) -> Self {
        Self::new(public_key, true, false)
    }

    pub fn program(public_key: PublicKey) -> Self {
        Self {
            public_key,
            is_signer: false,
            is_writable: false,
            is_payer: false,
            is_program: true,
        }
    }

    fn new(public_key: PublicKey, is_signer: bool, is_writable: bool) -> Self {
        Self {
            public_key,
            is_signer,
            is_writable,
            is_payer: false,
            is_program: false,
        }
    }

    /// Fold another reference to the same key into this one. Privileges
    /// only ever widen.
    pub fn merge(&mut self, other: &AccountMeta) {
        self.is_signer |= other.is_signer;
        self.is_writable |= other.is_writable;
        self.is_payer |= other.is_payer;
        self.is_program |= other.is_program;
    }

    /// Canonical position in a message's account list: payer, then
    /// non-programs before programs, signers before non-signers, writable
    /// before readonly, and finally key bytes.
    pub fn message_order(&self, other: &AccountMeta) -> Ordering {
        other
            .is_payer
            .cmp(&self.is_payer)
            .then(self.is_program.cmp(&other.is_program))
            .then(other.is_signer.cmp(&self.is_signer))
            .then(other.is_writable.cmp(&self.is_writable))
            .then(self.public_key.cmp(&other.public_key))
    }
}

// ---------------------------------------------------------------------------
// Instruction
// ---------------------------------------------------------------------------

/// An instruction before it is compiled into a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub program: PublicKey,
    pub accounts: Vec<AccountMeta>,
    pub data: Vec<u8>,
}

impl Instruction {
    /// Replace the program and account keys with indices into `keys`.
    pub fn compile(&self, keys: &[PublicKey]) -> Result<CompiledInstruction, SolError> {
        let index_of = |key: &PublicKey| -> Result<u8, SolError> {
            let position = keys.iter().position(|k| k == key).ok_or_else(|| {
                SolError::TransactionBuildError(format!("{key} is not in the account list"))
            })?;
            u8::try_from(position).map_err(|_| {
                SolError::TransactionBuildError("more than 256 accounts in message".into())
            })
        };

        Ok(CompiledInstruction {
            program_index: index_of(&self.program)?,
            account_indices: self
                .accounts
                .iter()
                .map(|meta| index_of(&meta.public_key))
                .collect::<Result<_, _>>()?,
            data: self.data.clone(),
        })
    }

    /// Key of the account at `position`. Only called after the account
    /// count has been checked by [`Program::parse`].
    pub(crate) fn key(&self, position: usize) -> PublicKey {
        self.accounts[position].public_key
    }
}

/// An instruction whose program and accounts are indices into the
/// message's account list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledInstruction {
    pub program_index: u8,
    pub account_indices: Vec<u8>,
    pub data: Vec<u8>,
}

impl CompiledInstruction {
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + 1 + self.account_indices.len() + 2 + self.data.len());
        out.push(self.program_index);
        out.extend_from_slice(&encode_buffer(&self.account_indices));
        out.extend_from_slice(&encode_buffer(&self.data));
        out
    }

    pub fn decode(reader: &mut WireReader<'_>) -> Result<Self, SolError> {
        let program_index = reader.read_u8("instruction program index")?;
        let account_indices = reader.read_buffer("instruction account indices")?.to_vec();
        let data = reader.read_buffer("instruction data")?.to_vec();
        Ok(Self {
            program_index,
            account_indices,
            data,
        })
    }
}

// ---------------------------------------------------------------------------
// Programs and commands
// ---------------------------------------------------------------------------

/// A program's command enumeration, backed by a fixed-width discriminant.
pub trait Command: Copy + PartialEq + fmt::Debug {
    /// Width in bytes of the discriminant leading the instruction data.
    const WIDTH: usize;

    fn discriminant(&self) -> Vec<u8>;

    fn from_discriminant(bytes: &[u8]) -> Option<Self>;
}

/// Command type for programs that take no discriminant, such as the memo
/// program. It has no values, so no command can ever be requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoCommand {}

impl Command for NoCommand {
    const WIDTH: usize = 0;

    fn discriminant(&self) -> Vec<u8> {
        match *self {}
    }

    fn from_discriminant(_bytes: &[u8]) -> Option<Self> {
        None
    }
}

/// An on-ledger program with a fixed address.
pub trait Program {
    type Command: Command;

    const ADDRESS: PublicKey;

    /// Validate `instruction` against this program and return its payload.
    ///
    /// Checks, in order: the program address (`InstructionMismatch`), the
    /// command discriminant when one is expected (`CommandNotFound` if the
    /// data is too short, `PayloadNotFound` if it differs), then the account
    /// count (`AccountMismatch`). On success the discriminant is stripped.
    fn parse(
        command: Option<Self::Command>,
        instruction: &Instruction,
        expecting_accounts: usize,
    ) -> Result<&[u8], SolError> {
        if instruction.program != Self::ADDRESS {
            return Err(SolError::InstructionMismatch);
        }

        let mut payload = instruction.data.as_slice();
        if let Some(command) = command {
            let width = Self::Command::WIDTH;
            if payload.len() < width {
                return Err(SolError::CommandNotFound);
            }
            let (discriminant, rest) = payload.split_at(width);
            if discriminant != command.discriminant().as_slice() {
                return Err(SolError::PayloadNotFound);
            }
            payload = rest;
        }

        if instruction.accounts.len() != expecting_accounts {
            return Err(SolError::AccountMismatch {
                expected: expecting_accounts,
                found: instruction.accounts.len(),
            });
        }

        Ok(payload)
    }

    /// Identify which command an instruction for this program carries.
    fn command_of(instruction: &Instruction) -> Result<Self::Command, SolError> {
        if instruction.program != Self::ADDRESS {
            return Err(SolError::InstructionMismatch);
        }
        let width = Self::Command::WIDTH;
        let discriminant = instruction
            .data
            .get(..width)
            .ok_or(SolError::CommandNotFound)?;
        Self::Command::from_discriminant(discriminant).ok_or(SolError::PayloadNotFound)
    }

    /// Assemble an instruction for this program, prefixing the command's
    /// discriminant to `args`.
    fn instruction(
        command: Option<Self::Command>,
        accounts: Vec<AccountMeta>,
        args: &[u8],
    ) -> Instruction {
        let mut data = command.map(|c| c.discriminant()).unwrap_or_default();
        data.extend_from_slice(args);
        Instruction {
            program: Self::ADDRESS,
            accounts,
            data,
        }
    }
}

/// A typed instruction that can be built into, and parsed back from, a
/// plain [`Instruction`]. `parse(&x.build())` yields `x` for every value.
pub trait InstructionType: Sized {
    fn build(&self) -> Instruction;

    fn parse(instruction: &Instruction) -> Result<Self, SolError>;
}
