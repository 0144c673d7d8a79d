//! SPL Token program instructions.
//!
//! Built by hand instead of pulling in the `spl-token` crate.

use crate::error::SolError;
use crate::instruction::{AccountMeta, Command, Instruction, InstructionType, Program};
use crate::keys::PublicKey;
use crate::short_vec::WireReader;

/// SPL Token Program ID: `TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA`
pub const TOKEN_PROGRAM_ID: PublicKey = PublicKey::new([
    0x06, 0xdd, 0xf6, 0xe1, 0xd7, 0x65, 0xa1, 0x93, 0xd9, 0xcb, 0xe1, 0x46, 0xce, 0xeb,
    0x79, 0xac, 0x1c, 0xb4, 0x85, 0xed, 0x5f, 0x5b, 0x37, 0x91, 0x3a, 0x8c, 0xf5, 0x85,
    0x7e, 0xff, 0x00, 0xa9,
]);

pub struct TokenProgram;

impl Program for TokenProgram {
    type Command = TokenCommand;
    const ADDRESS: PublicKey = TOKEN_PROGRAM_ID;
}

/// Single-byte token instruction index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenCommand {
    Transfer,
    SetAuthority,
}

impl Command for TokenCommand {
    const WIDTH: usize = 1;

    fn discriminant(&self) -> Vec<u8> {
        match self {
            TokenCommand::Transfer => vec![3],
            TokenCommand::SetAuthority => vec![6],
        }
    }

    fn from_discriminant(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [3] => Some(TokenCommand::Transfer),
            [6] => Some(TokenCommand::SetAuthority),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Transfer
// ---------------------------------------------------------------------------

/// Move `amount` base units between two token accounts.
///
/// Accounts: source (writable), destination (writable), owner (signer).
/// Data: `[3]` + u64 LE amount, 9 bytes total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenTransfer {
    pub source: PublicKey,
    pub destination: PublicKey,
    pub owner: PublicKey,
    pub amount: u64,
}

impl InstructionType for TokenTransfer {
    fn build(&self) -> Instruction {
        TokenProgram::instruction(
            Some(TokenCommand::Transfer),
            vec![
                AccountMeta::writable(self.source),
                AccountMeta::writable(self.destination),
                AccountMeta::readonly_signer(self.owner),
            ],
            &self.amount.to_le_bytes(),
        )
    }

    fn parse(instruction: &Instruction) -> Result<Self, SolError> {
        let payload = TokenProgram::parse(Some(TokenCommand::Transfer), instruction, 3)?;
        let mut args = WireReader::new(payload);
        let amount = args.read_u64_le("amount")?;
        args.finish("token transfer args")?;

        Ok(Self {
            source: instruction.key(0),
            destination: instruction.key(1),
            owner: instruction.key(2),
            amount,
        })
    }
}

// ---------------------------------------------------------------------------
// SetAuthority
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorityType {
    MintTokens,
    FreezeAccount,
    AccountOwner,
    CloseAccount,
}

impl AuthorityType {
    fn to_byte(self) -> u8 {
        match self {
            AuthorityType::MintTokens => 0,
            AuthorityType::FreezeAccount => 1,
            AuthorityType::AccountOwner => 2,
            AuthorityType::CloseAccount => 3,
        }
    }

    fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(AuthorityType::MintTokens),
            1 => Some(AuthorityType::FreezeAccount),
            2 => Some(AuthorityType::AccountOwner),
            3 => Some(AuthorityType::CloseAccount),
            _ => None,
        }
    }
}

/// Replace (or clear, when `new_authority` is `None`) an authority on a
/// mint or token account.
///
/// Accounts: account (writable), current authority (signer).
/// Data: `[6]`, authority type, then `0` or `1` + 32-byte key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetAuthority {
    pub account: PublicKey,
    pub authority_type: AuthorityType,
    pub current_authority: PublicKey,
    pub new_authority: Option<PublicKey>,
}

impl InstructionType for SetAuthority {
    fn build(&self) -> Instruction {
        let mut args = vec![self.authority_type.to_byte()];
        match self.new_authority {
            Some(authority) => {
                args.push(1);
                args.extend_from_slice(authority.as_ref());
            }
            None => args.push(0),
        }

        TokenProgram::instruction(
            Some(TokenCommand::SetAuthority),
            vec![
                AccountMeta::writable(self.account),
                AccountMeta::readonly_signer(self.current_authority),
            ],
            &args,
        )
    }

    fn parse(instruction: &Instruction) -> Result<Self, SolError> {
        let payload = TokenProgram::parse(Some(TokenCommand::SetAuthority), instruction, 2)?;
        let mut args = WireReader::new(payload);

        let kind = args.read_u8("authority type")?;
        let authority_type = AuthorityType::from_byte(kind)
            .ok_or_else(|| SolError::malformed(format!("unknown authority type {kind}")))?;
        let new_authority = match args.read_u8("authority option")? {
            0 => None,
            1 => Some(args.read_fixed::<PublicKey>("new authority")?),
            tag => return Err(SolError::malformed(format!("bad option tag {tag}"))),
        };
        args.finish("set authority args")?;

        Ok(Self {
            account: instruction.key(0),
            authority_type,
            current_authority: instruction.key(1),
            new_authority,
        })
    }
}

/// Every token instruction this crate understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenInstruction {
    Transfer(TokenTransfer),
    SetAuthority(SetAuthority),
}

impl InstructionType for TokenInstruction {
    fn build(&self) -> Instruction {
        match self {
            TokenInstruction::Transfer(ix) => ix.build(),
            TokenInstruction::SetAuthority(ix) => ix.build(),
        }
    }

    fn parse(instruction: &Instruction) -> Result<Self, SolError> {
        match TokenProgram::command_of(instruction)? {
            TokenCommand::Transfer => TokenTransfer::parse(instruction).map(TokenInstruction::Transfer),
            TokenCommand::SetAuthority => {
                SetAuthority::parse(instruction).map(TokenInstruction::SetAuthority)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transfer() -> TokenTransfer {
        TokenTransfer {
            source: PublicKey::new([1; 32]),
            destination: PublicKey::new([2; 32]),
            owner: PublicKey::new([3; 32]),
            amount: 500_000,
        }
    }

    #[test]
    fn token_program_id_roundtrip() {
        assert_eq!(
            TOKEN_PROGRAM_ID.to_string(),
            "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA"
        );
    }

    #[test]
    fn transfer_data_encoding() {
        let ix = transfer().build();
        assert_eq!(ix.data.len(), 9);
        assert_eq!(ix.data[0], 3);
        assert_eq!(&ix.data[1..], &500_000u64.to_le_bytes());
    }

    #[test]
    fn transfer_account_roles() {
        let ix = transfer().build();
        assert_eq!(ix.accounts.len(), 3);
        assert!(ix.accounts[0].is_writable && !ix.accounts[0].is_signer);
        assert!(ix.accounts[1].is_writable && !ix.accounts[1].is_signer);
        assert!(ix.accounts[2].is_signer && !ix.accounts[2].is_writable);
    }

    #[test]
    fn transfer_roundtrip() {
        assert_eq!(TokenTransfer::parse(&transfer().build()), Ok(transfer()));
    }

    #[test]
    fn transfer_rejects_wrong_program() {
        let mut ix = transfer().build();
        ix.program = PublicKey::new([0; 32]);
        assert_eq!(TokenTransfer::parse(&ix), Err(SolError::InstructionMismatch));
    }

    #[test]
    fn transfer_rejects_wrong_command() {
        let mut ix = transfer().build();
        ix.data[0] = 7;
        assert_eq!(TokenTransfer::parse(&ix), Err(SolError::PayloadNotFound));
    }

    #[test]
    fn transfer_rejects_wrong_account_count() {
        let mut ix = transfer().build();
        ix.accounts.push(AccountMeta::readonly(PublicKey::new([4; 32])));
        assert_eq!(
            TokenTransfer::parse(&ix),
            Err(SolError::AccountMismatch {
                expected: 3,
                found: 4
            })
        );
    }

    #[test]
    fn set_authority_roundtrip() {
        let set = SetAuthority {
            account: PublicKey::new([5; 32]),
            authority_type: AuthorityType::CloseAccount,
            current_authority: PublicKey::new([6; 32]),
            new_authority: Some(PublicKey::new([7; 32])),
        };
        let ix = set.build();
        assert_eq!(ix.data.len(), 1 + 1 + 1 + 32);
        assert_eq!(&ix.data[..3], &[6, 3, 1]);
        assert_eq!(SetAuthority::parse(&ix), Ok(set));

        let cleared = SetAuthority {
            new_authority: None,
            ..set
        };
        let ix = cleared.build();
        assert_eq!(ix.data, vec![6, 3, 0]);
        assert_eq!(
            TokenInstruction::parse(&ix),
            Ok(TokenInstruction::SetAuthority(cleared))
        );
    }

    #[test]
    fn set_authority_rejects_mismatches() {
        let ix = SetAuthority {
            account: PublicKey::new([5; 32]),
            authority_type: AuthorityType::CloseAccount,
            current_authority: PublicKey::new([6; 32]),
            new_authority: Some(PublicKey::new([7; 32])),
        }
        .build();

        let mut wrong_program = ix.clone();
        wrong_program.program = PublicKey::new([0; 32]);
        assert_eq!(
            SetAuthority::parse(&wrong_program),
            Err(SolError::InstructionMismatch)
        );

        let mut wrong_command = ix.clone();
        wrong_command.data[0] = 3;
        assert_eq!(
            SetAuthority::parse(&wrong_command),
            Err(SolError::PayloadNotFound)
        );

        let mut extra_account = ix;
        extra_account
            .accounts
            .push(AccountMeta::readonly(PublicKey::new([8; 32])));
        assert_eq!(
            SetAuthority::parse(&extra_account),
            Err(SolError::AccountMismatch {
                expected: 2,
                found: 3
            })
        );
    }

    #[test]
    fn set_authority_rejects_bad_option_tag() {
        let mut ix = SetAuthority {
            account: PublicKey::new([5; 32]),
            authority_type: AuthorityType::AccountOwner,
            current_authority: PublicKey::new([6; 32]),
            new_authority: None,
        }
        .build();
        ix.data[2] = 2;
        assert!(matches!(
            SetAuthority::parse(&ix),
            Err(SolError::MalformedWireData(_))
        ));
    }
}
