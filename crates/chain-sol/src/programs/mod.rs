//! On-ledger programs the wallet talks to.
//!
//! Each submodule declares the program address, its command discriminants
//! and one struct per instruction. [`ProgramInstruction`] recognises any
//! instruction belonging to one of them.

pub mod associated_token;
pub mod memo;
pub mod system;
pub mod timelock;
pub mod token;

use crate::error::SolError;
use crate::instruction::{Instruction, InstructionType};

use associated_token::{CreateIdempotent, ASSOCIATED_TOKEN_PROGRAM_ID};
use memo::{Memo, MEMO_PROGRAM_ID};
use system::{SystemInstruction, SYSTEM_PROGRAM_ID};
use timelock::{TimelockInstruction, TIMELOCK_PROGRAM_ID};
use token::{TokenInstruction, TOKEN_PROGRAM_ID};

/// Any instruction from a known program, dispatched on program address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramInstruction {
    System(SystemInstruction),
    Token(TokenInstruction),
    AssociatedToken(CreateIdempotent),
    Memo(Memo),
    Timelock(TimelockInstruction),
}

impl InstructionType for ProgramInstruction {
    fn build(&self) -> Instruction {
        match self {
            ProgramInstruction::System(ix) => ix.build(),
            ProgramInstruction::Token(ix) => ix.build(),
            ProgramInstruction::AssociatedToken(ix) => ix.build(),
            ProgramInstruction::Memo(ix) => ix.build(),
            ProgramInstruction::Timelock(ix) => ix.build(),
        }
    }

    fn parse(instruction: &Instruction) -> Result<Self, SolError> {
        match instruction.program {
            SYSTEM_PROGRAM_ID => SystemInstruction::parse(instruction).map(Self::System),
            TOKEN_PROGRAM_ID => TokenInstruction::parse(instruction).map(Self::Token),
            ASSOCIATED_TOKEN_PROGRAM_ID => {
                CreateIdempotent::parse(instruction).map(Self::AssociatedToken)
            }
            MEMO_PROGRAM_ID => Memo::parse(instruction).map(Self::Memo),
            TIMELOCK_PROGRAM_ID => TimelockInstruction::parse(instruction).map(Self::Timelock),
            _ => Err(SolError::InstructionMismatch),
        }
    }
}
