//! Associated Token Account (ATA) program: address derivation and
//! idempotent account creation.

use crate::error::SolError;
use crate::instruction::{AccountMeta, Command, Instruction, InstructionType, Program};
use crate::keys::PublicKey;
use crate::pda::{find_program_address, ProgramDerivedAccount};
use crate::programs::system::{SYSTEM_PROGRAM_ID, SYSVAR_RENT_ID};
use crate::programs::token::TOKEN_PROGRAM_ID;
use crate::short_vec::WireReader;

/// Associated Token Account Program ID: `ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL`
pub const ASSOCIATED_TOKEN_PROGRAM_ID: PublicKey = PublicKey::new([
    0x8c, 0x97, 0x25, 0x8f, 0x4e, 0x24, 0x89, 0xf1, 0xbb, 0x3d, 0x10, 0x29, 0x14, 0x8e,
    0x0d, 0x83, 0x0b, 0x5a, 0x13, 0x99, 0xda, 0xff, 0x10, 0x84, 0x04, 0x8e, 0x7b, 0xd8,
    0xdb, 0xe9, 0xf8, 0x59,
]);

/// Derive the associated token account for an owner + mint pair.
///
/// The ATA is a PDA with seeds `[owner, token_program_id, mint]` under the
/// Associated Token Account program.
pub fn derive_associated_token_account(
    owner: &PublicKey,
    mint: &PublicKey,
) -> Result<ProgramDerivedAccount, SolError> {
    find_program_address(
        &ASSOCIATED_TOKEN_PROGRAM_ID,
        &[owner.as_ref(), TOKEN_PROGRAM_ID.as_ref(), mint.as_ref()],
    )
}

pub struct AssociatedTokenProgram;

impl Program for AssociatedTokenProgram {
    type Command = AssociatedTokenCommand;
    const ADDRESS: PublicKey = ASSOCIATED_TOKEN_PROGRAM_ID;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssociatedTokenCommand {
    CreateIdempotent,
}

impl Command for AssociatedTokenCommand {
    const WIDTH: usize = 1;

    fn discriminant(&self) -> Vec<u8> {
        match self {
            AssociatedTokenCommand::CreateIdempotent => vec![1],
        }
    }

    fn from_discriminant(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [1] => Some(AssociatedTokenCommand::CreateIdempotent),
            _ => None,
        }
    }
}

/// Create the associated token account for `owner` and `mint`, succeeding
/// if it already exists.
///
/// Accounts:
///   0. `[writable, signer]` funding account
///   1. `[writable]` associated token account
///   2. `[]` wallet owner
///   3. `[]` token mint
///   4. `[]` system program
///   5. `[]` token program
///   6. `[]` rent sysvar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateIdempotent {
    pub subsidizer: PublicKey,
    pub address: PublicKey,
    pub owner: PublicKey,
    pub mint: PublicKey,
}

impl CreateIdempotent {
    /// Build the instruction, deriving the account address from `owner` and `mint`.
    pub fn new(subsidizer: PublicKey, owner: PublicKey, mint: PublicKey) -> Result<Self, SolError> {
        let address = derive_associated_token_account(&owner, &mint)?.public_key;
        Ok(Self {
            subsidizer,
            address,
            owner,
            mint,
        })
    }
}

impl InstructionType for CreateIdempotent {
    fn build(&self) -> Instruction {
        AssociatedTokenProgram::instruction(
            Some(AssociatedTokenCommand::CreateIdempotent),
            vec![
                AccountMeta::writable_signer(self.subsidizer),
                AccountMeta::writable(self.address),
                AccountMeta::readonly(self.owner),
                AccountMeta::readonly(self.mint),
                AccountMeta::readonly(SYSTEM_PROGRAM_ID),
                AccountMeta::readonly(TOKEN_PROGRAM_ID),
                AccountMeta::readonly(SYSVAR_RENT_ID),
            ],
            &[],
        )
    }

    fn parse(instruction: &Instruction) -> Result<Self, SolError> {
        let payload = AssociatedTokenProgram::parse(
            Some(AssociatedTokenCommand::CreateIdempotent),
            instruction,
            7,
        )?;
        WireReader::new(payload).finish("create idempotent args")?;

        Ok(Self {
            subsidizer: instruction.key(0),
            address: instruction.key(1),
            owner: instruction.key(2),
            mint: instruction.key(3),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(address: &str) -> PublicKey {
        PublicKey::from_base58(address).unwrap()
    }

    #[test]
    fn associated_token_program_id_roundtrip() {
        assert_eq!(
            ASSOCIATED_TOKEN_PROGRAM_ID.to_string(),
            "ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL"
        );
    }

    #[test]
    fn derive_known_associated_account() {
        let owner = key("4uQeVj5tqViQh7yWWGStvkEG1Zmhx6uasJtWCJziofM");
        let mint = key("8opHzTAnfzRpPEx21XtnrVTX28YQuCpAjcn1PczScKh");
        let ata = derive_associated_token_account(&owner, &mint).unwrap();
        assert_eq!(
            ata.public_key.to_string(),
            "H7MQwEzt97tUJryocn3qaEoy2ymWstwyEk1i9Yv3EmuZ"
        );
        assert!(!ata.public_key.is_on_curve());
    }

    #[test]
    fn different_mints_give_different_accounts() {
        let owner = PublicKey::new([0xaa; 32]);
        let a = derive_associated_token_account(&owner, &PublicKey::new([1; 32])).unwrap();
        let b = derive_associated_token_account(&owner, &PublicKey::new([2; 32])).unwrap();
        assert_ne!(a.public_key, b.public_key);
    }

    #[test]
    fn create_idempotent_roundtrip() {
        let create = CreateIdempotent::new(
            PublicKey::new([1; 32]),
            PublicKey::new([2; 32]),
            PublicKey::new([3; 32]),
        )
        .unwrap();
        let ix = create.build();
        assert_eq!(ix.data, vec![1]);
        assert_eq!(ix.accounts.len(), 7);
        assert_eq!(CreateIdempotent::parse(&ix), Ok(create));
    }

    #[test]
    fn create_idempotent_rejects_mismatches() {
        let create = CreateIdempotent::new(
            PublicKey::new([1; 32]),
            PublicKey::new([2; 32]),
            PublicKey::new([3; 32]),
        )
        .unwrap();

        let mut wrong_program = create.build();
        wrong_program.program = TOKEN_PROGRAM_ID;
        assert_eq!(
            CreateIdempotent::parse(&wrong_program),
            Err(SolError::InstructionMismatch)
        );

        let mut wrong_command = create.build();
        wrong_command.data = vec![0];
        assert_eq!(
            CreateIdempotent::parse(&wrong_command),
            Err(SolError::PayloadNotFound)
        );

        let mut wrong_accounts = create.build();
        wrong_accounts.accounts.truncate(6);
        assert_eq!(
            CreateIdempotent::parse(&wrong_accounts),
            Err(SolError::AccountMismatch {
                expected: 7,
                found: 6
            })
        );
    }
}
