//! Transaction wire format and signing.
//!
//! ```text
//! Transaction:
//!   num_signatures          compact-u16
//!   signatures              64 bytes * num_signatures
//!   message                 see [`crate::message`]
//! ```
//!
//! Signature `i` signs on behalf of `account_keys[i]`. Slots for signers
//! that have not signed yet hold 64 zero bytes.

use tracing::debug;

use crate::error::SolError;
use crate::instruction::{Instruction, InstructionType};
use crate::keys::{Hash, KeyPair, PublicKey, Signature};
use crate::message::Message;
use crate::programs::ProgramInstruction;
use crate::short_vec::{encode_fixed, WireReader};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub signatures: Vec<Signature>,
    pub message: Message,
}

impl Transaction {
    /// Compile an unsigned transaction paid for by `payer`.
    pub fn new(
        payer: &PublicKey,
        recent_blockhash: Hash,
        instructions: &[Instruction],
    ) -> Result<Self, SolError> {
        let message = Message::new(payer, recent_blockhash, instructions)?;
        Ok(Self::from_message(message))
    }

    /// Wrap `message` with one zeroed signature slot per required signer.
    pub fn from_message(message: Message) -> Self {
        let slots = message.header.num_required_signatures as usize;
        Self {
            signatures: vec![Signature::ZERO; slots],
            message,
        }
    }

    /// The bytes every signer signs.
    pub fn message_bytes(&self) -> Vec<u8> {
        self.message.encode()
    }

    /// Sign with each of `signers`, writing into the slot that matches its
    /// public key. Other slots are left as they are.
    pub fn sign(&mut self, signers: &[&KeyPair]) -> Result<(), SolError> {
        let message = self.message_bytes();
        let required = self.signatures.len();

        for signer in signers {
            let public_key = signer.public_key();
            let slot = self.message.account_keys[..required.min(self.message.account_keys.len())]
                .iter()
                .position(|key| *key == public_key)
                .ok_or_else(|| {
                    SolError::SigningError(format!("{public_key} is not a required signer"))
                })?;

            self.signatures[slot] = signer.sign(&message);
            debug!(signer = %public_key, slot, "signed transaction");
        }

        Ok(())
    }

    /// Whether every slot holds a valid signature over the message.
    pub fn is_fully_signed(&self) -> bool {
        let message = self.message_bytes();
        self.signatures.len() == self.message.header.num_required_signatures as usize
            && self
                .signatures
                .iter()
                .zip(&self.message.account_keys)
                .all(|(signature, key)| !signature.is_zero() && key.verify(&message, signature))
    }

    /// The first signature, which the ledger uses as the transaction id.
    pub fn identifier(&self) -> Option<Signature> {
        self.signatures.first().copied()
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut wire = encode_fixed(&self.signatures);
        wire.extend_from_slice(&self.message.encode());
        wire
    }

    /// Decode wire bytes. The input must hold exactly one transaction whose
    /// signature count matches its header.
    pub fn decode(bytes: &[u8]) -> Result<Self, SolError> {
        Self::decode_exact(bytes).inspect_err(|error| {
            debug!(%error, len = bytes.len(), "rejected transaction bytes");
        })
    }

    fn decode_exact(bytes: &[u8]) -> Result<Self, SolError> {
        let mut reader = WireReader::new(bytes);
        let signatures: Vec<Signature> = reader.read_fixed_list("signatures")?;
        let message = Message::decode(&mut reader)?;
        reader.finish("transaction")?;

        let required = message.header.num_required_signatures as usize;
        if signatures.len() != required {
            return Err(SolError::malformed(format!(
                "{} signatures for {required} required signers",
                signatures.len()
            )));
        }

        Ok(Self {
            signatures,
            message,
        })
    }

    /// Instructions with their account keys restored.
    pub fn instructions(&self) -> Result<Vec<Instruction>, SolError> {
        self.message.decompile()
    }

    /// The first instruction that parses as `T`, wherever it sits.
    pub fn find_instruction<T: InstructionType>(&self) -> Option<T> {
        self.instructions()
            .ok()?
            .iter()
            .find_map(|ix| T::parse(ix).ok())
    }

    /// Every instruction that belongs to a known program, in order.
    /// Unrecognised instructions are skipped.
    pub fn parsed_instructions(&self) -> Vec<ProgramInstruction> {
        self.instructions()
            .unwrap_or_default()
            .iter()
            .filter_map(|ix| ProgramInstruction::parse(ix).ok())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agora_memo::{AgoraMemo, TransferType};
    use crate::programs::memo::Memo;
    use crate::programs::system::{AdvanceNonce, SystemInstruction, SystemTransfer};
    use crate::programs::token::TokenTransfer;
    use proptest::prelude::*;

    fn payer() -> KeyPair {
        KeyPair::from_seed(&[7u8; 32])
    }

    fn owner() -> KeyPair {
        KeyPair::from_seed(&[8u8; 32])
    }

    fn sample(payer: &KeyPair, owner: &KeyPair) -> Transaction {
        let instructions = [
            AdvanceNonce {
                nonce: PublicKey::new([1; 32]),
                authority: payer.public_key(),
            }
            .build(),
            Memo {
                memo: AgoraMemo::new(TransferType::P2p, 268),
            }
            .build(),
            TokenTransfer {
                source: PublicKey::new([2; 32]),
                destination: PublicKey::new([3; 32]),
                owner: owner.public_key(),
                amount: 42,
            }
            .build(),
        ];
        Transaction::new(&payer.public_key(), Hash::new([0xab; 32]), &instructions).unwrap()
    }

    #[test]
    fn new_transaction_has_zeroed_slots() {
        let tx = sample(&payer(), &owner());
        assert_eq!(tx.signatures.len(), 2);
        assert!(tx.signatures.iter().all(Signature::is_zero));
        assert_eq!(tx.message.account_keys[0], payer().public_key());
        assert!(!tx.is_fully_signed());
    }

    #[test]
    fn sign_fills_matching_slots() {
        let (payer, owner) = (payer(), owner());
        let mut tx = sample(&payer, &owner);

        tx.sign(&[&payer]).unwrap();
        assert!(!tx.signatures[0].is_zero());
        assert!(tx.signatures[1].is_zero());
        assert_eq!(tx.identifier(), Some(tx.signatures[0]));

        tx.sign(&[&owner]).unwrap();
        assert!(tx.is_fully_signed());
        assert!(owner.verify(&tx.message_bytes(), &tx.signatures[1]));
    }

    #[test]
    fn sign_rejects_stranger() {
        let mut tx = sample(&payer(), &owner());
        let stranger = KeyPair::from_seed(&[9u8; 32]);
        assert!(matches!(
            tx.sign(&[&stranger]),
            Err(SolError::SigningError(_))
        ));
    }

    #[test]
    fn encode_decode_roundtrip() {
        let (payer, owner) = (payer(), owner());
        let mut tx = sample(&payer, &owner);
        tx.sign(&[&payer, &owner]).unwrap();

        let wire = tx.encode();
        let decoded = Transaction::decode(&wire).unwrap();
        assert_eq!(decoded, tx);
        assert_eq!(decoded.encode(), wire);
        assert!(decoded.is_fully_signed());
    }

    #[test]
    fn decode_rejects_trailing_bytes() {
        let mut wire = sample(&payer(), &owner()).encode();
        wire.push(0);
        assert!(matches!(
            Transaction::decode(&wire),
            Err(SolError::MalformedWireData(_))
        ));
    }

    #[test]
    fn decode_rejects_signature_count_mismatch() {
        let mut tx = sample(&payer(), &owner());
        tx.signatures.pop();
        assert!(matches!(
            Transaction::decode(&tx.encode()),
            Err(SolError::MalformedWireData(_))
        ));
    }

    #[test]
    fn decode_rejects_padded_signature_count() {
        let wire = sample(&payer(), &owner()).encode();
        assert_eq!(wire[0], 2);

        let mut padded = vec![0x82, 0x00];
        padded.extend_from_slice(&wire[1..]);
        assert!(matches!(
            Transaction::decode(&padded),
            Err(SolError::MalformedWireData(_))
        ));
    }

    #[test]
    fn decode_rejects_truncation() {
        let wire = sample(&payer(), &owner()).encode();
        for len in [0, 1, 64, 129, 132, wire.len() - 1] {
            assert!(Transaction::decode(&wire[..len]).is_err(), "len {len}");
        }
    }

    #[test]
    fn find_instruction_ignores_position() {
        let tx = sample(&payer(), &owner());
        let transfer: TokenTransfer = tx.find_instruction().unwrap();
        assert_eq!(transfer.amount, 42);
        assert_eq!(transfer.owner, owner().public_key());

        let memo: Memo = tx.find_instruction().unwrap();
        assert_eq!(memo.memo.app_index, 268);

        assert!(tx.find_instruction::<SystemTransfer>().is_none());
    }

    #[test]
    fn parsed_instructions_in_order() {
        let tx = sample(&payer(), &owner());
        let parsed = tx.parsed_instructions();
        assert_eq!(parsed.len(), 3);
        assert!(matches!(
            parsed[0],
            ProgramInstruction::System(SystemInstruction::AdvanceNonce(_))
        ));
        assert!(matches!(parsed[1], ProgramInstruction::Memo(_)));
        assert!(matches!(parsed[2], ProgramInstruction::Token(_)));
    }

    proptest! {
        #[test]
        fn system_transfer_roundtrips(
            from in any::<[u8; 32]>(),
            to in any::<[u8; 32]>(),
            lamports in any::<u64>(),
            blockhash in any::<[u8; 32]>(),
        ) {
            let from = PublicKey::new(from);
            let ix = SystemTransfer { from, to: PublicKey::new(to), lamports }.build();
            let tx = Transaction::new(&from, Hash::new(blockhash), &[ix]).unwrap();

            let wire = tx.encode();
            let decoded = Transaction::decode(&wire).unwrap();
            prop_assert_eq!(&decoded, &tx);
            prop_assert_eq!(decoded.encode(), wire);

            let parsed: SystemTransfer = decoded.find_instruction().unwrap();
            prop_assert_eq!(parsed.lamports, lamports);
        }
    }
}
