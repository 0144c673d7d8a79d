//! Memo program (v1). Instruction data is the base64 text of an
//! [`AgoraMemo`]; there is no command discriminant and no account.

use crate::agora_memo::AgoraMemo;
use crate::error::SolError;
use crate::instruction::{Instruction, InstructionType, NoCommand, Program};
use crate::keys::PublicKey;

/// Memo Program v1: `Memo1UhkJRfHyvLMcVucJwxXeuD728EqVDDwQDxFMNo`
pub const MEMO_PROGRAM_ID: PublicKey = PublicKey::new([
    0x05, 0x4a, 0x53, 0x50, 0xf8, 0x5d, 0xc8, 0x82, 0xd6, 0x14, 0xa5, 0x56, 0x72, 0x78,
    0x8a, 0x29, 0x6d, 0xdf, 0x1e, 0xab, 0xab, 0xd0, 0xa6, 0x06, 0x78, 0x88, 0x49, 0x32,
    0xf4, 0xee, 0xf6, 0xa0,
]);

pub struct MemoProgram;

impl Program for MemoProgram {
    type Command = NoCommand;
    const ADDRESS: PublicKey = MEMO_PROGRAM_ID;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Memo {
    pub memo: AgoraMemo,
}

impl InstructionType for Memo {
    fn build(&self) -> Instruction {
        MemoProgram::instruction(None, Vec::new(), self.memo.encode().as_bytes())
    }

    fn parse(instruction: &Instruction) -> Result<Self, SolError> {
        let payload = MemoProgram::parse(None, instruction, 0)?;
        Ok(Self {
            memo: AgoraMemo::decode(payload)?,
        })
    }
}
