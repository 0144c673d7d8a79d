//! Timelock custody program.
//!
//! A user's funds sit in a vault token account owned by a timelock state
//! PDA. Moving funds requires both the owner and the time authority to
//! sign; reclaiming a dormant vault first revokes and deactivates the lock,
//! then withdraws and closes.
//!
//! Every instruction starts with an 8-byte discriminant followed by the
//! state account's bump seed.

use crate::error::SolError;
use crate::instruction::{AccountMeta, Command, Instruction, InstructionType, Program};
use crate::keys::PublicKey;
use crate::pda::{find_program_address, ProgramDerivedAccount};
use crate::programs::system::SYSTEM_PROGRAM_ID;
use crate::programs::token::TOKEN_PROGRAM_ID;
use crate::short_vec::WireReader;

/// Timelock program: `time2Z2SCnn3qYg3ULKVtdkh8YmZ5jFdKicnA1W2YnJ`
pub const TIMELOCK_PROGRAM_ID: PublicKey = PublicKey::new([
    0x0d, 0x3f, 0xd9, 0xaf, 0x4d, 0x8b, 0x3f, 0x30, 0xfa, 0xc5, 0xbe, 0x4d, 0x7f, 0x6c,
    0x78, 0xf9, 0x1d, 0x27, 0xef, 0x05, 0x89, 0xc8, 0xa0, 0x1f, 0x6a, 0x1e, 0x80, 0xc8,
    0x09, 0x56, 0x5c, 0x57,
]);

const STATE_SEED: &[u8] = b"timelock_state";
const VAULT_SEED: &[u8] = b"timelock_vault";

/// Derive the timelock state account for `owner`.
///
/// Seeds: `["timelock_state", mint, time_authority, owner, [lockout_days]]`.
pub fn derive_state_account(
    mint: &PublicKey,
    time_authority: &PublicKey,
    owner: &PublicKey,
    lockout_days: u8,
) -> Result<ProgramDerivedAccount, SolError> {
    find_program_address(
        &TIMELOCK_PROGRAM_ID,
        &[
            STATE_SEED,
            mint.as_ref(),
            time_authority.as_ref(),
            owner.as_ref(),
            &[lockout_days],
        ],
    )
}

/// Derive the vault token account held by a timelock state account.
///
/// Seeds: `["timelock_vault", state, [data_version]]`.
pub fn derive_vault_account(
    state: &PublicKey,
    data_version: u8,
) -> Result<ProgramDerivedAccount, SolError> {
    find_program_address(
        &TIMELOCK_PROGRAM_ID,
        &[VAULT_SEED, state.as_ref(), &[data_version]],
    )
}

pub struct TimelockProgram;

impl Program for TimelockProgram {
    type Command = TimelockCommand;
    const ADDRESS: PublicKey = TIMELOCK_PROGRAM_ID;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelockCommand {
    TransferWithAuthority,
    BurnDustWithAuthority,
    RevokeLockWithAuthority,
    DeactivateLock,
    Withdraw,
    CloseAccounts,
}

impl TimelockCommand {
    const ALL: [TimelockCommand; 6] = [
        TimelockCommand::TransferWithAuthority,
        TimelockCommand::BurnDustWithAuthority,
        TimelockCommand::RevokeLockWithAuthority,
        TimelockCommand::DeactivateLock,
        TimelockCommand::Withdraw,
        TimelockCommand::CloseAccounts,
    ];

    pub const fn bytes(self) -> [u8; 8] {
        match self {
            TimelockCommand::TransferWithAuthority => [0x44, 0x80, 0xde, 0xc0, 0x81, 0x45, 0x47, 0xa5],
            TimelockCommand::BurnDustWithAuthority => [0x27, 0x2a, 0xff, 0xda, 0x0e, 0x7c, 0x4e, 0x2d],
            TimelockCommand::RevokeLockWithAuthority => [0xe5, 0xb5, 0x3a, 0xf2, 0xab, 0x08, 0xc9, 0x90],
            TimelockCommand::DeactivateLock => [0x2c, 0x70, 0x21, 0xac, 0x71, 0x1c, 0x8e, 0x0d],
            TimelockCommand::Withdraw => [0xb7, 0x12, 0x46, 0x9c, 0x94, 0x6d, 0xa1, 0x22],
            TimelockCommand::CloseAccounts => [0xab, 0xde, 0x5e, 0xe9, 0x22, 0xfa, 0xca, 0x01],
        }
    }
}

impl Command for TimelockCommand {
    const WIDTH: usize = 8;

    fn discriminant(&self) -> Vec<u8> {
        self.bytes().to_vec()
    }

    fn from_discriminant(bytes: &[u8]) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|command| command.bytes().as_slice() == bytes)
    }
}

fn read_bump(payload: &[u8]) -> Result<u8, SolError> {
    let mut args = WireReader::new(payload);
    let bump = args.read_u8("bump")?;
    args.finish("timelock args")?;
    Ok(bump)
}

fn read_bump_and_amount(payload: &[u8]) -> Result<(u8, u64), SolError> {
    let mut args = WireReader::new(payload);
    let bump = args.read_u8("bump")?;
    let amount = args.read_u64_le("amount")?;
    args.finish("timelock args")?;
    Ok((bump, amount))
}

fn bump_and_amount(bump: u8, amount: u64) -> Vec<u8> {
    let mut args = Vec::with_capacity(9);
    args.push(bump);
    args.extend_from_slice(&amount.to_le_bytes());
    args
}

// ---------------------------------------------------------------------------
// TransferWithAuthority
// ---------------------------------------------------------------------------

/// Move `quarks` out of the vault, co-signed by owner and time authority.
///
///   0. `[]` timelock state
///   1. `[writable]` vault
///   2. `[signer]` vault owner
///   3. `[signer]` time authority
///   4. `[writable]` destination token account
///   5. `[writable, signer]` payer
///   6. `[]` token program
///   7. `[]` system program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferWithAuthority {
    pub timelock: PublicKey,
    pub vault: PublicKey,
    pub vault_owner: PublicKey,
    pub time_authority: PublicKey,
    pub destination: PublicKey,
    pub payer: PublicKey,
    pub bump: u8,
    pub quarks: u64,
}

impl InstructionType for TransferWithAuthority {
    fn build(&self) -> Instruction {
        TimelockProgram::instruction(
            Some(TimelockCommand::TransferWithAuthority),
            vec![
                AccountMeta::readonly(self.timelock),
                AccountMeta::writable(self.vault),
                AccountMeta::readonly_signer(self.vault_owner),
                AccountMeta::readonly_signer(self.time_authority),
                AccountMeta::writable(self.destination),
                AccountMeta::writable_signer(self.payer),
                AccountMeta::readonly(TOKEN_PROGRAM_ID),
                AccountMeta::readonly(SYSTEM_PROGRAM_ID),
            ],
            &bump_and_amount(self.bump, self.quarks),
        )
    }

    fn parse(instruction: &Instruction) -> Result<Self, SolError> {
        let payload = TimelockProgram::parse(
            Some(TimelockCommand::TransferWithAuthority),
            instruction,
            8,
        )?;
        let (bump, quarks) = read_bump_and_amount(payload)?;

        Ok(Self {
            timelock: instruction.key(0),
            vault: instruction.key(1),
            vault_owner: instruction.key(2),
            time_authority: instruction.key(3),
            destination: instruction.key(4),
            payer: instruction.key(5),
            bump,
            quarks,
        })
    }
}

// ---------------------------------------------------------------------------
// BurnDustWithAuthority
// ---------------------------------------------------------------------------

/// Burn up to `max_quarks` left in the vault so it can be closed.
///
///   0. `[writable]` timelock state
///   1. `[writable]` vault
///   2. `[signer]` vault owner
///   3. `[signer]` time authority
///   4. `[writable]` mint
///   5. `[writable, signer]` payer
///   6. `[]` token program
///   7. `[]` system program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BurnDustWithAuthority {
    pub timelock: PublicKey,
    pub vault: PublicKey,
    pub vault_owner: PublicKey,
    pub time_authority: PublicKey,
    pub mint: PublicKey,
    pub payer: PublicKey,
    pub bump: u8,
    pub max_quarks: u64,
}

impl InstructionType for BurnDustWithAuthority {
    fn build(&self) -> Instruction {
        TimelockProgram::instruction(
            Some(TimelockCommand::BurnDustWithAuthority),
            vec![
                AccountMeta::writable(self.timelock),
                AccountMeta::writable(self.vault),
                AccountMeta::readonly_signer(self.vault_owner),
                AccountMeta::readonly_signer(self.time_authority),
                AccountMeta::writable(self.mint),
                AccountMeta::writable_signer(self.payer),
                AccountMeta::readonly(TOKEN_PROGRAM_ID),
                AccountMeta::readonly(SYSTEM_PROGRAM_ID),
            ],
            &bump_and_amount(self.bump, self.max_quarks),
        )
    }

    fn parse(instruction: &Instruction) -> Result<Self, SolError> {
        let payload = TimelockProgram::parse(
            Some(TimelockCommand::BurnDustWithAuthority),
            instruction,
            8,
        )?;
        let (bump, max_quarks) = read_bump_and_amount(payload)?;

        Ok(Self {
            timelock: instruction.key(0),
            vault: instruction.key(1),
            vault_owner: instruction.key(2),
            time_authority: instruction.key(3),
            mint: instruction.key(4),
            payer: instruction.key(5),
            bump,
            max_quarks,
        })
    }
}

// ---------------------------------------------------------------------------
// RevokeLockWithAuthority
// ---------------------------------------------------------------------------

///   0. `[writable]` timelock state
///   1. `[writable]` vault
///   2. `[signer]` time authority
///   3. `[writable, signer]` payer
///   4. `[]` token program
///   5. `[]` system program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevokeLockWithAuthority {
    pub timelock: PublicKey,
    pub vault: PublicKey,
    pub time_authority: PublicKey,
    pub payer: PublicKey,
    pub bump: u8,
}

impl InstructionType for RevokeLockWithAuthority {
    fn build(&self) -> Instruction {
        TimelockProgram::instruction(
            Some(TimelockCommand::RevokeLockWithAuthority),
            vec![
                AccountMeta::writable(self.timelock),
                AccountMeta::writable(self.vault),
                AccountMeta::readonly_signer(self.time_authority),
                AccountMeta::writable_signer(self.payer),
                AccountMeta::readonly(TOKEN_PROGRAM_ID),
                AccountMeta::readonly(SYSTEM_PROGRAM_ID),
            ],
            &[self.bump],
        )
    }

    fn parse(instruction: &Instruction) -> Result<Self, SolError> {
        let payload = TimelockProgram::parse(
            Some(TimelockCommand::RevokeLockWithAuthority),
            instruction,
            6,
        )?;

        Ok(Self {
            timelock: instruction.key(0),
            vault: instruction.key(1),
            time_authority: instruction.key(2),
            payer: instruction.key(3),
            bump: read_bump(payload)?,
        })
    }
}

// ---------------------------------------------------------------------------
// DeactivateLock
// ---------------------------------------------------------------------------

///   0. `[writable]` timelock state
///   1. `[signer]` vault owner
///   2. `[writable, signer]` payer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeactivateLock {
    pub timelock: PublicKey,
    pub vault_owner: PublicKey,
    pub payer: PublicKey,
    pub bump: u8,
}

impl InstructionType for DeactivateLock {
    fn build(&self) -> Instruction {
        TimelockProgram::instruction(
            Some(TimelockCommand::DeactivateLock),
            vec![
                AccountMeta::writable(self.timelock),
                AccountMeta::readonly_signer(self.vault_owner),
                AccountMeta::writable_signer(self.payer),
            ],
            &[self.bump],
        )
    }

    fn parse(instruction: &Instruction) -> Result<Self, SolError> {
        let payload =
            TimelockProgram::parse(Some(TimelockCommand::DeactivateLock), instruction, 3)?;

        Ok(Self {
            timelock: instruction.key(0),
            vault_owner: instruction.key(1),
            payer: instruction.key(2),
            bump: read_bump(payload)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Withdraw
// ---------------------------------------------------------------------------

/// Withdraw the whole vault balance once the lock is deactivated.
///
///   0. `[]` timelock state
///   1. `[writable]` vault
///   2. `[signer]` vault owner
///   3. `[writable]` destination token account
///   4. `[writable, signer]` payer
///   5. `[]` token program
///   6. `[]` system program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Withdraw {
    pub timelock: PublicKey,
    pub vault: PublicKey,
    pub vault_owner: PublicKey,
    pub destination: PublicKey,
    pub payer: PublicKey,
    pub bump: u8,
}

impl InstructionType for Withdraw {
    fn build(&self) -> Instruction {
        TimelockProgram::instruction(
            Some(TimelockCommand::Withdraw),
            vec![
                AccountMeta::readonly(self.timelock),
                AccountMeta::writable(self.vault),
                AccountMeta::readonly_signer(self.vault_owner),
                AccountMeta::writable(self.destination),
                AccountMeta::writable_signer(self.payer),
                AccountMeta::readonly(TOKEN_PROGRAM_ID),
                AccountMeta::readonly(SYSTEM_PROGRAM_ID),
            ],
            &[self.bump],
        )
    }

    fn parse(instruction: &Instruction) -> Result<Self, SolError> {
        let payload = TimelockProgram::parse(Some(TimelockCommand::Withdraw), instruction, 7)?;

        Ok(Self {
            timelock: instruction.key(0),
            vault: instruction.key(1),
            vault_owner: instruction.key(2),
            destination: instruction.key(3),
            payer: instruction.key(4),
            bump: read_bump(payload)?,
        })
    }
}

// ---------------------------------------------------------------------------
// CloseAccounts
// ---------------------------------------------------------------------------

/// Close an empty vault and its state account, refunding rent to the payer.
///
///   0. `[writable]` timelock state
///   1. `[writable]` vault
///   2. `[signer]` close authority
///   3. `[writable, signer]` payer
///   4. `[]` token program
///   5. `[]` system program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CloseAccounts {
    pub timelock: PublicKey,
    pub vault: PublicKey,
    pub close_authority: PublicKey,
    pub payer: PublicKey,
    pub bump: u8,
}

impl InstructionType for CloseAccounts {
    fn build(&self) -> Instruction {
        TimelockProgram::instruction(
            Some(TimelockCommand::CloseAccounts),
            vec![
                AccountMeta::writable(self.timelock),
                AccountMeta::writable(self.vault),
                AccountMeta::readonly_signer(self.close_authority),
                AccountMeta::writable_signer(self.payer),
                AccountMeta::readonly(TOKEN_PROGRAM_ID),
                AccountMeta::readonly(SYSTEM_PROGRAM_ID),
            ],
            &[self.bump],
        )
    }

    fn parse(instruction: &Instruction) -> Result<Self, SolError> {
        let payload =
            TimelockProgram::parse(Some(TimelockCommand::CloseAccounts), instruction, 6)?;

        Ok(Self {
            timelock: instruction.key(0),
            vault: instruction.key(1),
            close_authority: instruction.key(2),
            payer: instruction.key(3),
            bump: read_bump(payload)?,
        })
    }
}

/// Every timelock instruction, dispatched on its discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelockInstruction {
    TransferWithAuthority(TransferWithAuthority),
    BurnDustWithAuthority(BurnDustWithAuthority),
    RevokeLockWithAuthority(RevokeLockWithAuthority),
    DeactivateLock(DeactivateLock),
    Withdraw(Withdraw),
    CloseAccounts(CloseAccounts),
}

impl InstructionType for TimelockInstruction {
    fn build(&self) -> Instruction {
        match self {
            TimelockInstruction::TransferWithAuthority(ix) => ix.build(),
            TimelockInstruction::BurnDustWithAuthority(ix) => ix.build(),
            TimelockInstruction::RevokeLockWithAuthority(ix) => ix.build(),
            TimelockInstruction::DeactivateLock(ix) => ix.build(),
            TimelockInstruction::Withdraw(ix) => ix.build(),
            TimelockInstruction::CloseAccounts(ix) => ix.build(),
        }
    }

    fn parse(instruction: &Instruction) -> Result<Self, SolError> {
        use TimelockInstruction as Ix;

        match TimelockProgram::command_of(instruction)? {
            TimelockCommand::TransferWithAuthority => {
                TransferWithAuthority::parse(instruction).map(Ix::TransferWithAuthority)
            }
            TimelockCommand::BurnDustWithAuthority => {
                BurnDustWithAuthority::parse(instruction).map(Ix::BurnDustWithAuthority)
            }
            TimelockCommand::RevokeLockWithAuthority => {
                RevokeLockWithAuthority::parse(instruction).map(Ix::RevokeLockWithAuthority)
            }
            TimelockCommand::DeactivateLock => {
                DeactivateLock::parse(instruction).map(Ix::DeactivateLock)
            }
            TimelockCommand::Withdraw => Withdraw::parse(instruction).map(Ix::Withdraw),
            TimelockCommand::CloseAccounts => {
                CloseAccounts::parse(instruction).map(Ix::CloseAccounts)
            }
        }
    }
}
