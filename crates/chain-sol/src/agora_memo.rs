//! Agora memo: a 32-byte bit-packed header carried as base64 text in a
//! memo instruction.
//!
//! Fields are packed from LSB to MSB:
//!
//! ```text
//! magic          2 bits   (1 to 3, written as 1)
//! version        3 bits
//! transfer type  5 bits
//! app index     16 bits
//! foreign key  230 bits   (28 bytes plus 6 bits)
//! ```

use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine};

use crate::error::SolError;

pub const MEMO_BYTE_LENGTH: usize = 32;
pub const FOREIGN_KEY_LENGTH: usize = 28;

const MAGIC_BYTE: u8 = 1;

/// Why a payment was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferType {
    None,
    Earn,
    Spend,
    P2p,
}

impl TransferType {
    pub fn to_byte(self) -> u8 {
        match self {
            TransferType::None => 0,
            TransferType::Earn => 1,
            TransferType::Spend => 2,
            TransferType::P2p => 3,
        }
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(TransferType::None),
            1 => Some(TransferType::Earn),
            2 => Some(TransferType::Spend),
            3 => Some(TransferType::P2p),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AgoraMemo {
    pub magic: u8,
    pub version: u8,
    pub transfer_type: TransferType,
    pub app_index: u16,
    pub foreign_key: [u8; FOREIGN_KEY_LENGTH],
}

impl AgoraMemo {
    pub fn new(transfer_type: TransferType, app_index: u16) -> Self {
        Self {
            magic: MAGIC_BYTE,
            version: 1,
            transfer_type,
            app_index,
            foreign_key: [0u8; FOREIGN_KEY_LENGTH],
        }
    }

    /// Copy up to 28 bytes of `key` into the foreign key, zero padding the rest.
    pub fn with_foreign_key(mut self, key: &[u8]) -> Self {
        let len = key.len().min(FOREIGN_KEY_LENGTH);
        self.foreign_key = [0u8; FOREIGN_KEY_LENGTH];
        self.foreign_key[..len].copy_from_slice(&key[..len]);
        self
    }

    pub fn to_bytes(&self) -> [u8; MEMO_BYTE_LENGTH] {
        let kind = self.transfer_type.to_byte();
        let fk = &self.foreign_key;
        let mut out = [0u8; MEMO_BYTE_LENGTH];

        out[0] = self.magic & 0x3 | (self.version & 0x7) << 2 | (kind & 0x7) << 5;
        out[1] = (kind & 0x1c) >> 2 | ((self.app_index & 0x3f) as u8) << 2;
        out[2] = ((self.app_index & 0x3fc0) >> 6) as u8;
        out[3] = ((self.app_index & 0xc000) >> 14) as u8 | (fk[0] & 0x3f) << 2;

        // Each byte takes the top 2 bits of one key byte and the low 6 of the next.
        for i in 4..3 + FOREIGN_KEY_LENGTH {
            out[i] = (fk[i - 4] >> 6) & 0x3 | (fk[i - 3] & 0x3f) << 2;
        }
        out[3 + FOREIGN_KEY_LENGTH] = (fk[FOREIGN_KEY_LENGTH - 1] >> 6) & 0x3;

        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SolError> {
        let bytes: &[u8; MEMO_BYTE_LENGTH] = bytes.try_into().map_err(|_| {
            SolError::InvalidMemo(format!(
                "expected {MEMO_BYTE_LENGTH} bytes, got {}",
                bytes.len()
            ))
        })?;

        let header = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let magic = (header & 0x3) as u8;
        let version = ((header & 0x1c) >> 2) as u8;
        let kind = ((header & 0x3e0) >> 5) as u8;
        let app_index = ((header & 0x3ff_fc00) >> 10) as u16;

        if magic == 0 {
            return Err(SolError::InvalidMemo(format!("bad magic {magic}")));
        }
        let transfer_type = TransferType::from_byte(kind)
            .ok_or_else(|| SolError::InvalidMemo(format!("unknown transfer type {kind}")))?;

        let mut foreign_key = [0u8; FOREIGN_KEY_LENGTH];
        for (i, byte) in foreign_key.iter_mut().enumerate() {
            *byte = (bytes[i + 3] >> 2) & 0x3f | (bytes[i + 4] & 0x3) << 6;
        }

        Ok(Self {
            magic,
            version,
            transfer_type,
            app_index,
            foreign_key,
        })
    }

    /// Base64 text as carried in memo instruction data.
    pub fn encode(&self) -> String {
        BASE64_STANDARD.encode(self.to_bytes())
    }

    pub fn decode(text: &[u8]) -> Result<Self, SolError> {
        let bytes = BASE64_STANDARD
            .decode(text)
            .map_err(|e| SolError::InvalidMemo(format!("base64 decode failed: {e}")))?;
        Self::from_bytes(&bytes)
    }
}
