//! Transaction message: header, account list, blockhash and compiled
//! instructions.
//!
//! ```text
//! Message:
//!   num_required_sigs     u8
//!   num_readonly_signed   u8
//!   num_readonly_unsigned u8
//!   num_accounts          compact-u16
//!   account_keys          32 bytes * num_accounts
//!   recent_blockhash      32 bytes
//!   num_instructions      compact-u16
//!   instructions[]        program index u8, account indices, data
//! ```

use tracing::debug;

use crate::error::SolError;
use crate::instruction::{AccountMeta, CompiledInstruction, Instruction};
use crate::keys::{Hash, PublicKey};
use crate::short_vec::{encode_fixed, encode_length, WireReader};

/// The three counts that tell a verifier which accounts sign and which
/// may be written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MessageHeader {
    pub num_required_signatures: u8,
    pub num_readonly_signed: u8,
    pub num_readonly_unsigned: u8,
}

impl MessageHeader {
    pub fn is_signer(&self, index: usize) -> bool {
        index < self.num_required_signatures as usize
    }

    /// Whether the account at `index` of a list of `total` keys is writable.
    pub fn is_writable(&self, index: usize, total: usize) -> bool {
        let required = self.num_required_signatures as usize;
        if index < required {
            index < required - self.num_readonly_signed as usize
        } else {
            index < total.saturating_sub(self.num_readonly_unsigned as usize)
        }
    }

    fn encode(&self) -> [u8; 3] {
        [
            self.num_required_signatures,
            self.num_readonly_signed,
            self.num_readonly_unsigned,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub header: MessageHeader,
    pub account_keys: Vec<PublicKey>,
    pub recent_blockhash: Hash,
    pub instructions: Vec<CompiledInstruction>,
}

impl Message {
    /// Compile `instructions` into a message paid for by `payer`.
    ///
    /// Accounts are deduplicated with their privileges merged, then sorted
    /// by [`AccountMeta::message_order`].
    pub fn new(
        payer: &PublicKey,
        recent_blockhash: Hash,
        instructions: &[Instruction],
    ) -> Result<Self, SolError> {
        let mut metas: Vec<AccountMeta> = vec![AccountMeta::payer(*payer)];

        let mut upsert = |meta: AccountMeta| {
            match metas.iter_mut().find(|m| m.public_key == meta.public_key) {
                Some(existing) => existing.merge(&meta),
                None => metas.push(meta),
            }
        };
        for ix in instructions {
            upsert(AccountMeta::program(ix.program));
            for meta in &ix.accounts {
                upsert(*meta);
            }
        }

        metas.sort_by(AccountMeta::message_order);

        let count = |pred: fn(&AccountMeta) -> bool| -> Result<u8, SolError> {
            u8::try_from(metas.iter().filter(|m| pred(m)).count()).map_err(|_| {
                SolError::TransactionBuildError("more than 255 accounts in a header count".into())
            })
        };
        let header = MessageHeader {
            num_required_signatures: count(|m| m.is_signer)?,
            num_readonly_signed: count(|m| m.is_signer && !m.is_writable)?,
            num_readonly_unsigned: count(|m| !m.is_signer && !m.is_writable)?,
        };

        let account_keys: Vec<PublicKey> = metas.iter().map(|m| m.public_key).collect();
        let compiled = instructions
            .iter()
            .map(|ix| ix.compile(&account_keys))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            payer = %payer,
            accounts = account_keys.len(),
            signers = header.num_required_signatures,
            instructions = compiled.len(),
            "compiled message"
        );

        Ok(Self {
            header,
            account_keys,
            recent_blockhash,
            instructions: compiled,
        })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(256);

        buf.extend_from_slice(&self.header.encode());
        buf.extend_from_slice(&encode_fixed(&self.account_keys));
        buf.extend_from_slice(&self.recent_blockhash.to_bytes());

        buf.extend_from_slice(&encode_length(self.instructions.len()));
        for ix in &self.instructions {
            buf.extend_from_slice(&ix.encode());
        }

        buf
    }

    /// Read a message from `reader`, leaving any following bytes unread.
    ///
    /// The header counts must fit the account list and every instruction
    /// index must resolve within it.
    pub fn decode(reader: &mut WireReader<'_>) -> Result<Self, SolError> {
        let header = MessageHeader {
            num_required_signatures: reader.read_u8("header required signatures")?,
            num_readonly_signed: reader.read_u8("header readonly signed")?,
            num_readonly_unsigned: reader.read_u8("header readonly unsigned")?,
        };
        let account_keys: Vec<PublicKey> = reader.read_fixed_list("account keys")?;
        let recent_blockhash: Hash = reader.read_fixed("recent blockhash")?;

        let count = reader.read_length("instruction count")?;
        let mut instructions = Vec::with_capacity(count.min(64));
        for _ in 0..count {
            instructions.push(CompiledInstruction::decode(reader)?);
        }

        let total = account_keys.len();
        let required = header.num_required_signatures as usize;
        if required > total
            || header.num_readonly_signed as usize > required
            || header.num_readonly_unsigned as usize > total - required
        {
            return Err(SolError::malformed(format!(
                "header {header:?} does not fit {total} account keys"
            )));
        }

        for (position, ix) in instructions.iter().enumerate() {
            let out_of_range = std::iter::once(&ix.program_index)
                .chain(&ix.account_indices)
                .find(|&&index| index as usize >= total);
            if let Some(index) = out_of_range {
                return Err(SolError::malformed(format!(
                    "instruction {position} references account {index} of {total}"
                )));
            }
        }

        Ok(Self {
            header,
            account_keys,
            recent_blockhash,
            instructions,
        })
    }

    /// Rebuild full instructions, substituting account keys for indices.
    ///
    /// Account privileges come from the message header, so they reflect
    /// what the ledger grants rather than what each instruction asked for.
    pub fn decompile(&self) -> Result<Vec<Instruction>, SolError> {
        let total = self.account_keys.len();
        let key = |index: u8| {
            self.account_keys
                .get(index as usize)
                .copied()
                .ok_or_else(|| SolError::malformed(format!("account {index} of {total}")))
        };
        let meta = |index: u8| -> Result<AccountMeta, SolError> {
            let position = index as usize;
            Ok(AccountMeta {
                public_key: key(index)?,
                is_signer: self.header.is_signer(position),
                is_writable: self.header.is_writable(position, total),
                is_payer: position == 0,
                is_program: false,
            })
        };

        self.instructions
            .iter()
            .map(|ix| {
                Ok(Instruction {
                    program: key(ix.program_index)?,
                    accounts: ix
                        .account_indices
                        .iter()
                        .map(|&i| meta(i))
                        .collect::<Result<_, _>>()?,
                    data: ix.data.clone(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(byte: u8) -> PublicKey {
        PublicKey::new([byte; 32])
    }

    fn sample() -> Message {
        let program = key(0xf0);
        let instructions = [
            Instruction {
                program,
                accounts: vec![
                    AccountMeta::readonly(key(5)),
                    AccountMeta::writable(key(4)),
                    AccountMeta::readonly_signer(key(3)),
                ],
                data: vec![1, 2, 3],
            },
            Instruction {
                program,
                accounts: vec![AccountMeta::writable_signer(key(9)), AccountMeta::writable(key(5))],
                data: vec![],
            },
        ];
        Message::new(&key(9), Hash::new([0xbb; 32]), &instructions).unwrap()
    }

    #[test]
    fn payer_first_then_privilege_order() {
        let message = sample();
        let order: Vec<u8> = message.account_keys.iter().map(|k| k.to_bytes()[0]).collect();
        // payer, readonly signer, writable (4 and 5 after merge), program
        assert_eq!(order, vec![9, 3, 4, 5, 0xf0]);
        assert_eq!(
            message.header,
            MessageHeader {
                num_required_signatures: 2,
                num_readonly_signed: 1,
                num_readonly_unsigned: 1,
            }
        );
    }

    #[test]
    fn compiled_indices_point_at_keys() {
        let message = sample();
        assert_eq!(message.instructions[0].program_index, 4);
        assert_eq!(message.instructions[0].account_indices, vec![3, 2, 1]);
        assert_eq!(message.instructions[1].account_indices, vec![0, 3]);
    }

    #[test]
    fn header_privileges() {
        let header = MessageHeader {
            num_required_signatures: 2,
            num_readonly_signed: 1,
            num_readonly_unsigned: 1,
        };
        assert!(header.is_signer(1));
        assert!(!header.is_signer(2));
        assert!(header.is_writable(0, 5));
        assert!(!header.is_writable(1, 5));
        assert!(header.is_writable(3, 5));
        assert!(!header.is_writable(4, 5));
    }

    #[test]
    fn encode_decode_roundtrip() {
        let message = sample();
        let bytes = message.encode();
        let mut reader = WireReader::new(&bytes);
        assert_eq!(Message::decode(&mut reader).unwrap(), message);
        assert!(reader.is_empty());
    }

    #[test]
    fn decompile_restores_keys() {
        let message = sample();
        let instructions = message.decompile().unwrap();
        assert_eq!(instructions.len(), 2);
        assert_eq!(instructions[0].program, key(0xf0));
        let keys: Vec<PublicKey> = instructions[0].accounts.iter().map(|m| m.public_key).collect();
        assert_eq!(keys, vec![key(5), key(4), key(3)]);
        assert!(instructions[0].accounts[1].is_writable);
        assert!(instructions[0].accounts[2].is_signer);
        assert_eq!(instructions[0].data, vec![1, 2, 3]);
    }

    #[test]
    fn decompile_reports_dangling_index() {
        let mut message = sample();
        message.instructions[0].account_indices.push(42);
        assert!(matches!(
            message.decompile(),
            Err(SolError::MalformedWireData(_))
        ));
    }

    #[test]
    fn decode_rejects_every_truncation() {
        let bytes = sample().encode();
        for len in 0..bytes.len() {
            let mut reader = WireReader::new(&bytes[..len]);
            assert!(
                matches!(Message::decode(&mut reader), Err(SolError::MalformedWireData(_))),
                "prefix of {len} bytes decoded"
            );
        }
    }

    #[test]
    fn decode_rejects_out_of_range_index() {
        let mut message = sample();
        message.instructions[1].account_indices[1] = 5;
        let bytes = message.encode();
        assert!(Message::decode(&mut WireReader::new(&bytes)).is_err());

        let mut message = sample();
        message.instructions[0].program_index = 200;
        let bytes = message.encode();
        assert!(Message::decode(&mut WireReader::new(&bytes)).is_err());
    }

    #[test]
    fn decode_rejects_oversized_header() {
        let mut message = sample();
        message.header.num_required_signatures = 6;
        let bytes = message.encode();
        assert!(Message::decode(&mut WireReader::new(&bytes)).is_err());
    }
}
