//! Builders for the timelock operations the wallet signs.
//!
//! Every transaction is paid for by the configured subsidizer and starts by
//! advancing a durable nonce. The returned transaction is unsigned: the
//! subsidizer fills slot 0 and the owner fills its own slot when the
//! operation needs the owner's signature.

use chain_sol::programs::memo::Memo;
use chain_sol::programs::system::AdvanceNonce;
use chain_sol::programs::timelock::{
    BurnDustWithAuthority, CloseAccounts, DeactivateLock, RevokeLockWithAuthority,
    TransferWithAuthority, Withdraw,
};
use chain_sol::{AgoraMemo, Hash, Instruction, InstructionType, PublicKey, Transaction, TransferType};
use tracing::debug;

use crate::accounts::TimelockDerivedAccounts;
use crate::config::ProtocolConfig;
use crate::error::WalletError;
use crate::kin::Kin;

fn advance_nonce(nonce: &PublicKey, config: &ProtocolConfig) -> Instruction {
    AdvanceNonce {
        nonce: *nonce,
        authority: config.subsidizer,
    }
    .build()
}

fn p2p_memo(app_index: u16) -> Instruction {
    Memo {
        memo: AgoraMemo::new(TransferType::P2p, app_index),
    }
    .build()
}

/// Move `amount` out of the vault into `destination`, co-signed by the
/// time authority.
///
/// `app_index` overrides the configured Agora app index for the memo.
pub fn transfer(
    accounts: &TimelockDerivedAccounts,
    destination: &PublicKey,
    amount: Kin,
    nonce: &PublicKey,
    recent_blockhash: Hash,
    config: &ProtocolConfig,
    app_index: Option<u16>,
) -> Result<Transaction, WalletError> {
    let instructions = [
        advance_nonce(nonce, config),
        p2p_memo(app_index.unwrap_or(config.app_index)),
        TransferWithAuthority {
            timelock: accounts.state.public_key,
            vault: accounts.vault.public_key,
            vault_owner: accounts.owner,
            time_authority: config.time_authority,
            destination: *destination,
            payer: config.subsidizer,
            bump: accounts.state.bump,
            quarks: amount.quarks(),
        }
        .build(),
    ];

    debug!(
        owner = %accounts.owner,
        %destination,
        quarks = amount.quarks(),
        instructions = instructions.len(),
        "built timelock transfer"
    );
    Ok(Transaction::new(&config.subsidizer, recent_blockhash, &instructions)?)
}

/// Unlock a dormant vault, sweep its whole balance to `destination` and
/// close both timelock accounts.
pub fn close_dormant_account(
    accounts: &TimelockDerivedAccounts,
    destination: &PublicKey,
    nonce: &PublicKey,
    recent_blockhash: Hash,
    config: &ProtocolConfig,
) -> Result<Transaction, WalletError> {
    let timelock = accounts.state.public_key;
    let vault = accounts.vault.public_key;
    let bump = accounts.state.bump;

    let instructions = [
        advance_nonce(nonce, config),
        p2p_memo(config.app_index),
        RevokeLockWithAuthority {
            timelock,
            vault,
            time_authority: config.time_authority,
            payer: config.subsidizer,
            bump,
        }
        .build(),
        DeactivateLock {
            timelock,
            vault_owner: accounts.owner,
            payer: config.subsidizer,
            bump,
        }
        .build(),
        Withdraw {
            timelock,
            vault,
            vault_owner: accounts.owner,
            destination: *destination,
            payer: config.subsidizer,
            bump,
        }
        .build(),
        CloseAccounts {
            timelock,
            vault,
            close_authority: config.subsidizer,
            payer: config.subsidizer,
            bump,
        }
        .build(),
    ];

    debug!(
        owner = %accounts.owner,
        %destination,
        instructions = instructions.len(),
        "built close dormant account"
    );
    Ok(Transaction::new(&config.subsidizer, recent_blockhash, &instructions)?)
}

/// Burn the leftover dust in a vault and close its timelock accounts.
///
/// Fails with [`WalletError::DustLimitExceeded`] when `balance` is above
/// `max_dust`. A zero balance skips the burn.
pub fn close_empty_account(
    accounts: &TimelockDerivedAccounts,
    max_dust: Kin,
    balance: Kin,
    nonce: &PublicKey,
    recent_blockhash: Hash,
    config: &ProtocolConfig,
) -> Result<Transaction, WalletError> {
    if balance > max_dust {
        return Err(WalletError::DustLimitExceeded {
            balance: balance.quarks(),
            max: max_dust.quarks(),
        });
    }

    let timelock = accounts.state.public_key;
    let vault = accounts.vault.public_key;
    let bump = accounts.state.bump;

    let mut instructions = vec![advance_nonce(nonce, config)];
    if !balance.is_zero() {
        instructions.push(
            BurnDustWithAuthority {
                timelock,
                vault,
                vault_owner: accounts.owner,
                time_authority: config.time_authority,
                mint: config.mint,
                payer: config.subsidizer,
                bump,
                max_quarks: max_dust.quarks(),
            }
            .build(),
        );
    }
    instructions.push(
        CloseAccounts {
            timelock,
            vault,
            close_authority: config.subsidizer,
            payer: config.subsidizer,
            bump,
        }
        .build(),
    );

    debug!(
        owner = %accounts.owner,
        balance = balance.quarks(),
        instructions = instructions.len(),
        "built close empty account"
    );
    Ok(Transaction::new(&config.subsidizer, recent_blockhash, &instructions)?)
}

#[cfg(test)]
mod tests {
    use chain_sol::programs::system::SystemInstruction;
    use chain_sol::programs::timelock::TimelockInstruction;
    use chain_sol::{ProgramInstruction, Signature};

    use super::*;

    fn key(byte: u8) -> PublicKey {
        PublicKey::new([byte; 32])
    }

    fn accounts() -> TimelockDerivedAccounts {
        TimelockDerivedAccounts::new(&key(0x42), &ProtocolConfig::default()).unwrap()
    }

    fn one_kin() -> Kin {
        Kin::from_kin(1).unwrap()
    }

    #[test]
    fn transfer_layout() {
        let config = ProtocolConfig::default();
        let accounts = accounts();
        let tx = transfer(
            &accounts,
            &key(9),
            Kin::from_kin(3).unwrap(),
            &key(7),
            Hash::new([1; 32]),
            &config,
            None,
        )
        .unwrap();

        assert_eq!(tx.signatures, vec![Signature::ZERO; 2]);
        assert_eq!(tx.message.account_keys[0], config.subsidizer);
        assert_eq!(tx.message.account_keys[1], accounts.owner);
        assert_eq!(tx.message.recent_blockhash, Hash::new([1; 32]));

        let nonce: AdvanceNonce = tx.find_instruction().unwrap();
        assert_eq!(nonce.nonce, key(7));
        assert_eq!(nonce.authority, config.subsidizer);

        let memo: Memo = tx.find_instruction().unwrap();
        assert_eq!(memo.memo.transfer_type, TransferType::P2p);
        assert_eq!(memo.memo.app_index, config.app_index);

        let transfer: TransferWithAuthority = tx.find_instruction().unwrap();
        assert_eq!(transfer.quarks, 300_000);
        assert_eq!(transfer.bump, accounts.state.bump);
        assert_eq!(transfer.vault, accounts.vault.public_key);
        assert_eq!(transfer.destination, key(9));
    }

    #[test]
    fn transfer_app_index_override() {
        let tx = transfer(
            &accounts(),
            &key(9),
            one_kin(),
            &key(7),
            Hash::new([1; 32]),
            &ProtocolConfig::default(),
            Some(12),
        )
        .unwrap();
        let memo: Memo = tx.find_instruction().unwrap();
        assert_eq!(memo.memo.app_index, 12);
    }

    #[test]
    fn close_dormant_sequence() {
        let config = ProtocolConfig::default();
        let tx = close_dormant_account(&accounts(), &key(9), &key(7), Hash::new([2; 32]), &config)
            .unwrap();

        let parsed = tx.parsed_instructions();
        assert_eq!(parsed.len(), 6);
        assert!(matches!(
            parsed[0],
            ProgramInstruction::System(SystemInstruction::AdvanceNonce(_))
        ));
        assert!(matches!(parsed[1], ProgramInstruction::Memo(_)));
        assert!(matches!(
            parsed[2],
            ProgramInstruction::Timelock(TimelockInstruction::RevokeLockWithAuthority(_))
        ));
        assert!(matches!(
            parsed[3],
            ProgramInstruction::Timelock(TimelockInstruction::DeactivateLock(_))
        ));
        assert!(matches!(
            parsed[4],
            ProgramInstruction::Timelock(TimelockInstruction::Withdraw(_))
        ));
        assert!(matches!(
            parsed[5],
            ProgramInstruction::Timelock(TimelockInstruction::CloseAccounts(_))
        ));

        assert!(tx.find_instruction::<TransferWithAuthority>().is_none());
        assert!(tx.find_instruction::<BurnDustWithAuthority>().is_none());

        let withdraw: Withdraw = tx.find_instruction().unwrap();
        assert_eq!(withdraw.destination, key(9));
        let close: CloseAccounts = tx.find_instruction().unwrap();
        assert_eq!(close.close_authority, config.subsidizer);
    }

    #[test]
    fn close_empty_burns_dust() {
        let tx = close_empty_account(
            &accounts(),
            one_kin(),
            Kin::from_quarks(10),
            &key(7),
            Hash::new([3; 32]),
            &ProtocolConfig::default(),
        )
        .unwrap();

        assert_eq!(tx.parsed_instructions().len(), 3);
        assert!(tx.find_instruction::<Memo>().is_none());
        let burn: BurnDustWithAuthority = tx.find_instruction().unwrap();
        assert_eq!(burn.max_quarks, 100_000);
        assert!(tx.find_instruction::<CloseAccounts>().is_some());
    }

    #[test]
    fn close_empty_zero_balance_skips_burn() {
        let tx = close_empty_account(
            &accounts(),
            one_kin(),
            Kin::ZERO,
            &key(7),
            Hash::new([3; 32]),
            &ProtocolConfig::default(),
        )
        .unwrap();

        assert_eq!(tx.parsed_instructions().len(), 2);
        assert!(tx.find_instruction::<BurnDustWithAuthority>().is_none());
        assert!(tx.find_instruction::<CloseAccounts>().is_some());
    }

    #[test]
    fn close_empty_rejects_balance_over_limit() {
        let result = close_empty_account(
            &accounts(),
            one_kin(),
            Kin::from_quarks(100_001),
            &key(7),
            Hash::new([3; 32]),
            &ProtocolConfig::default(),
        );
        assert_eq!(
            result,
            Err(WalletError::DustLimitExceeded {
                balance: 100_001,
                max: 100_000
            })
        );
    }
}
