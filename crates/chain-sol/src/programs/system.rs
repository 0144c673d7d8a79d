//! System program: durable nonce advancement and native transfers.

use crate::error::SolError;
use crate::instruction::{AccountMeta, Command, Instruction, InstructionType, Program};
use crate::keys::PublicKey;
use crate::short_vec::WireReader;

/// The System Program public key: 32 zero bytes.
/// Base58: `11111111111111111111111111111111`
pub const SYSTEM_PROGRAM_ID: PublicKey = PublicKey::new([0u8; 32]);

/// Recent blockhashes sysvar: `SysvarRecentB1ockHashes11111111111111111111`
pub const SYSVAR_RECENT_BLOCKHASHES_ID: PublicKey = PublicKey::new([
    0x06, 0xa7, 0xd5, 0x17, 0x19, 0x2c, 0x56, 0x8e, 0xe0, 0x8a, 0x84, 0x5f, 0x73, 0xd2,
    0x97, 0x88, 0xcf, 0x03, 0x5c, 0x31, 0x45, 0xb2, 0x1a, 0xb3, 0x44, 0xd8, 0x06, 0x2e,
    0xa9, 0x40, 0x00, 0x00,
]);

/// Rent sysvar: `SysvarRent111111111111111111111111111111111`
pub const SYSVAR_RENT_ID: PublicKey = PublicKey::new([
    0x06, 0xa7, 0xd5, 0x17, 0x19, 0x2c, 0x5c, 0x51, 0x21, 0x8c, 0xc9, 0x4c, 0x3d, 0x4a,
    0xf1, 0x7f, 0x58, 0xda, 0xee, 0x08, 0x9b, 0xa1, 0xfd, 0x44, 0xe3, 0xdb, 0xd9, 0x8a,
    0x00, 0x00, 0x00, 0x00,
]);

pub struct SystemProgram;

impl Program for SystemProgram {
    type Command = SystemCommand;
    const ADDRESS: PublicKey = SYSTEM_PROGRAM_ID;
}

/// System instruction index, encoded as a little-endian u32.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemCommand {
    Transfer,
    AdvanceNonceAccount,
}

impl SystemCommand {
    fn index(self) -> u32 {
        match self {
            SystemCommand::Transfer => 2,
            SystemCommand::AdvanceNonceAccount => 4,
        }
    }
}

impl Command for SystemCommand {
    const WIDTH: usize = 4;

    fn discriminant(&self) -> Vec<u8> {
        self.index().to_le_bytes().to_vec()
    }

    fn from_discriminant(bytes: &[u8]) -> Option<Self> {
        let index = u32::from_le_bytes(bytes.try_into().ok()?);
        match index {
            2 => Some(SystemCommand::Transfer),
            4 => Some(SystemCommand::AdvanceNonceAccount),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// AdvanceNonceAccount
// ---------------------------------------------------------------------------

/// Advance a durable nonce account, consuming its current value as the
/// transaction's recent blockhash.
///
/// Accounts: nonce (writable), recent blockhashes sysvar, authority (signer).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvanceNonce {
    pub nonce: PublicKey,
    pub authority: PublicKey,
}

impl InstructionType for AdvanceNonce {
    fn build(&self) -> Instruction {
        SystemProgram::instruction(
            Some(SystemCommand::AdvanceNonceAccount),
            vec![
                AccountMeta::writable(self.nonce),
                AccountMeta::readonly(SYSVAR_RECENT_BLOCKHASHES_ID),
                AccountMeta::readonly_signer(self.authority),
            ],
            &[],
        )
    }

    fn parse(instruction: &Instruction) -> Result<Self, SolError> {
        let payload =
            SystemProgram::parse(Some(SystemCommand::AdvanceNonceAccount), instruction, 3)?;
        WireReader::new(payload).finish("advance nonce args")?;

        Ok(Self {
            nonce: instruction.key(0),
            authority: instruction.key(2),
        })
    }
}

// ---------------------------------------------------------------------------
// Transfer
// ---------------------------------------------------------------------------

/// Move `lamports` from `from` (signer) to `to`.
///
/// Instruction data: u32 LE instruction index (2) + u64 LE lamports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemTransfer {
    pub from: PublicKey,
    pub to: PublicKey,
    pub lamports: u64,
}

impl InstructionType for SystemTransfer {
    fn build(&self) -> Instruction {
        SystemProgram::instruction(
            Some(SystemCommand::Transfer),
            vec![
                AccountMeta::writable_signer(self.from),
                AccountMeta::writable(self.to),
            ],
            &self.lamports.to_le_bytes(),
        )
    }

    fn parse(instruction: &Instruction) -> Result<Self, SolError> {
        let payload = SystemProgram::parse(Some(SystemCommand::Transfer), instruction, 2)?;
        let mut args = WireReader::new(payload);
        let lamports = args.read_u64_le("lamports")?;
        args.finish("transfer args")?;

        Ok(Self {
            from: instruction.key(0),
            to: instruction.key(1),
            lamports,
        })
    }
}

/// Every system instruction this crate understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemInstruction {
    AdvanceNonce(AdvanceNonce),
    Transfer(SystemTransfer),
}

impl InstructionType for SystemInstruction {
    fn build(&self) -> Instruction {
        match self {
            SystemInstruction::AdvanceNonce(ix) => ix.build(),
            SystemInstruction::Transfer(ix) => ix.build(),
        }
    }

    fn parse(instruction: &Instruction) -> Result<Self, SolError> {
        match SystemProgram::command_of(instruction)? {
            SystemCommand::AdvanceNonceAccount => {
                AdvanceNonce::parse(instruction).map(SystemInstruction::AdvanceNonce)
            }
            SystemCommand::Transfer => {
                SystemTransfer::parse(instruction).map(SystemInstruction::Transfer)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn advance() -> AdvanceNonce {
        AdvanceNonce {
            nonce: PublicKey::new([1; 32]),
            authority: PublicKey::new([2; 32]),
        }
    }

    #[test]
    fn sysvar_address() {
        assert_eq!(
            SYSVAR_RECENT_BLOCKHASHES_ID.to_string(),
            "SysvarRecentB1ockHashes11111111111111111111"
        );
    }

    #[test]
    fn rent_sysvar_address() {
        assert_eq!(
            SYSVAR_RENT_ID.to_string(),
            "SysvarRent111111111111111111111111111111111"
        );
    }

    #[test]
    fn advance_nonce_data() {
        let ix = advance().build();
        assert_eq!(ix.program, SYSTEM_PROGRAM_ID);
        assert_eq!(ix.data, vec![4, 0, 0, 0]);
        assert_eq!(ix.accounts[1].public_key, SYSVAR_RECENT_BLOCKHASHES_ID);
        assert!(ix.accounts[0].is_writable);
        assert!(ix.accounts[2].is_signer);
        assert!(!ix.accounts[2].is_writable);
    }

    #[test]
    fn advance_nonce_roundtrip() {
        assert_eq!(AdvanceNonce::parse(&advance().build()), Ok(advance()));
    }

    #[test]
    fn advance_nonce_rejects_wrong_program() {
        let mut ix = advance().build();
        ix.program = PublicKey::new([9; 32]);
        assert_eq!(AdvanceNonce::parse(&ix), Err(SolError::InstructionMismatch));
    }

    #[test]
    fn advance_nonce_rejects_wrong_command() {
        let mut ix = advance().build();
        ix.data = vec![2, 0, 0, 0];
        assert_eq!(AdvanceNonce::parse(&ix), Err(SolError::PayloadNotFound));
    }

    #[test]
    fn advance_nonce_rejects_wrong_account_count() {
        let mut ix = advance().build();
        ix.accounts.pop();
        assert_eq!(
            AdvanceNonce::parse(&ix),
            Err(SolError::AccountMismatch {
                expected: 3,
                found: 2
            })
        );
    }

    #[test]
    fn transfer_data_is_12_bytes() {
        let ix = SystemTransfer {
            from: PublicKey::new([1; 32]),
            to: PublicKey::new([2; 32]),
            lamports: 1_000_000,
        }
        .build();
        // 4 bytes instruction index + 8 bytes lamports = 12.
        assert_eq!(ix.data.len(), 12);
        assert_eq!(&ix.data[..4], &[2, 0, 0, 0]);
        assert_eq!(&ix.data[4..], &1_000_000u64.to_le_bytes());
    }

    #[test]
    fn transfer_roundtrip_and_truncation() {
        let transfer = SystemTransfer {
            from: PublicKey::new([1; 32]),
            to: PublicKey::new([2; 32]),
            lamports: 42,
        };
        let mut ix = transfer.build();
        assert_eq!(SystemTransfer::parse(&ix), Ok(transfer));

        ix.data.truncate(8);
        assert!(matches!(
            SystemTransfer::parse(&ix),
            Err(SolError::MalformedWireData(_))
        ));
    }

    #[test]
    fn transfer_rejects_mismatches() {
        let ix = SystemTransfer {
            from: PublicKey::new([1; 32]),
            to: PublicKey::new([2; 32]),
            lamports: 42,
        }
        .build();

        let mut wrong_program = ix.clone();
        wrong_program.program = PublicKey::new([9; 32]);
        assert_eq!(
            SystemTransfer::parse(&wrong_program),
            Err(SolError::InstructionMismatch)
        );

        let mut wrong_command = ix.clone();
        wrong_command.data[..4].copy_from_slice(&[4, 0, 0, 0]);
        assert_eq!(
            SystemTransfer::parse(&wrong_command),
            Err(SolError::PayloadNotFound)
        );

        let mut missing_account = ix;
        missing_account.accounts.pop();
        assert_eq!(
            SystemTransfer::parse(&missing_account),
            Err(SolError::AccountMismatch {
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn short_data_has_no_command() {
        let mut ix = advance().build();
        ix.data = vec![4, 0];
        assert_eq!(AdvanceNonce::parse(&ix), Err(SolError::CommandNotFound));
    }

    #[test]
    fn enum_dispatches_on_command() {
        let ix = advance().build();
        assert_eq!(
            SystemInstruction::parse(&ix),
            Ok(SystemInstruction::AdvanceNonce(advance()))
        );
    }
}
